mod common;

use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{
        Request, Response, StatusCode,
        header::{COOKIE, LOCATION, SET_COOKIE},
    },
};
use collageify::{
    api::{self, AppState, auth::state_matches},
    utils,
};
use common::{MOCK_TOKEN, MockSpotify};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn send(mock: &MockSpotify, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    api::router(AppState::new(mock.config()))
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn location(response: &Response<Body>) -> String {
    response.headers()[LOCATION].to_str().unwrap().to_string()
}

#[test]
fn test_state_matches() {
    assert!(state_matches(Some("abc"), Some("abc")));
    assert!(!state_matches(Some("abc"), Some("xyz")));
    assert!(!state_matches(None, Some("abc")));
    assert!(!state_matches(Some("abc"), None));
    assert!(!state_matches(None, None));
    // Empty state must never pass, even when both sides are empty
    assert!(!state_matches(Some(""), Some("")));
    assert!(!state_matches(Some("s1abcdef"), Some("s1abcdeg")));
    assert!(!state_matches(Some("s1abcdef"), Some("s1abcde")));
}

#[tokio::test]
async fn test_login_redirects_to_authorize_url() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(&mock, "/login", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let cookies = set_cookies(&response);
    let state_cookie = cookies
        .iter()
        .find(|c| c.starts_with("spotify-state="))
        .expect("state cookie set");
    let state = state_cookie
        .trim_start_matches("spotify-state=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert_eq!(state.len(), utils::STATE_TOKEN_LEN);

    let url = url::Url::parse(&location(&response)).unwrap();
    assert_eq!(url.path(), "/authorize");
    assert_eq!(url.host_str(), Some("127.0.0.1"));

    let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "client-id");
    assert_eq!(
        params["scope"],
        "user-read-private user-read-email user-top-read"
    );
    assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/callback");
    assert_eq!(params["state"], state);

    // Building the redirect must not talk to the upstream
    assert_eq!(mock.recorder.total_calls(), 0);
}

#[tokio::test]
async fn test_login_generates_fresh_state_each_time() {
    let mock = MockSpotify::start(Vec::new()).await;
    let first = set_cookies(&send(&mock, "/login", None).await);
    let second = set_cookies(&send(&mock, "/login", None).await);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_callback_state_mismatch_is_forbidden() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(
        &mock,
        "/callback?code=abc&state=xyz",
        Some("spotify-state=abc"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookies(&response).iter().all(|c| !c.starts_with("ci_access_token=")));
    assert_eq!(body_text(response).await, "Potential CSRF detected");
    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_near_miss_states_are_forbidden() {
    let mock = MockSpotify::start(Vec::new()).await;
    let cases = [
        // last character differs
        ("s1abcdef", "s1abcdeg"),
        // first character differs
        ("s1abcdef", "t1abcdef"),
        // returned state is a prefix of the cookie
        ("s1abcdef", "s1abcde"),
        // cookie is a prefix of the returned state
        ("s1abcdef", "s1abcdefg"),
        // case differs
        ("s1abcdef", "S1abcdef"),
    ];

    for (cookie, returned) in cases {
        let response = send(
            &mock,
            &format!("/callback?code=abc&state={returned}"),
            Some(&format!("spotify-state={cookie}")),
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "{cookie} vs {returned}"
        );
    }

    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_without_state_cookie_is_forbidden() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(&mock, "/callback?code=abc&state=abc", None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_exchanges_code_and_sets_token_cookie() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(
        &mock,
        "/callback?code=the-code&state=s1",
        Some("spotify-state=s1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/create");

    let cookies = set_cookies(&response);
    let token_cookie = cookies
        .iter()
        .find(|c| c.starts_with("ci_access_token="))
        .expect("token cookie set");
    assert!(token_cookie.starts_with(&format!("ci_access_token={MOCK_TOKEN}")));
    assert!(token_cookie.contains("HttpOnly"));
    assert!(token_cookie.contains("Secure"));
    assert!(token_cookie.contains("SameSite=Lax"));
    assert!(token_cookie.contains("Max-Age=1800"));

    // The state is single use
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify-state=") && c.contains("Max-Age=0"))
    );

    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        mock.recorder.token_auth.lock().unwrap()[0],
        utils::basic_auth_header("client-id", "client-secret")
    );
    let form = mock.recorder.token_forms.lock().unwrap()[0].clone();
    assert_eq!(form["code"], "the-code");
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["redirect_uri"], "http://127.0.0.1:8080/callback");
}

#[tokio::test]
async fn test_callback_exchange_failure_reports_error() {
    let mock = MockSpotify::start(Vec::new()).await;
    mock.recorder.fail_token(StatusCode::BAD_REQUEST);

    let response = send(
        &mock,
        "/callback?code=expired&state=s1",
        Some("spotify-state=s1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(set_cookies(&response).iter().all(|c| !c.starts_with("ci_access_token=")));
    assert_eq!(
        body_text(response).await,
        "There was an error during authentication."
    );
    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_callback_with_denied_authorization_skips_exchange() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(
        &mock,
        "/callback?error=access_denied&state=s1",
        Some("spotify-state=s1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(mock.recorder.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logout_clears_token_without_upstream_calls() {
    let mock = MockSpotify::start(Vec::new()).await;
    let response = send(&mock, "/logout", Some("ci_access_token=tok")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("ci_access_token=;") && c.contains("Max-Age=0"))
    );
    assert_eq!(mock.recorder.total_calls(), 0);
}
