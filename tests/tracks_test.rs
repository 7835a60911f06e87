mod common;

use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header::COOKIE},
};
use collageify::{
    api::{self, AppState, tracks::TOP_TRACKS_ERROR},
    collage::{self, CollageConfig, ProxyTrackSource, SortKey, TimeRange, TrackSource},
    types::TopTracksPage,
};
use common::{MockSpotify, distinct_tracks};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
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

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serves the real router on an ephemeral port so HTTP clients can reach it.
async fn serve_app(mock: &MockSpotify) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::router(AppState::new(mock.config()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_proxy_without_token_returns_error_envelope() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    let response = send(&mock, "/api/getTopTracks", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Token not found" }));
    assert_eq!(mock.recorder.total_calls(), 0);
}

#[tokio::test]
async fn test_proxy_forwards_query_and_bearer_token() {
    let mock = MockSpotify::start(distinct_tracks(80)).await;
    let response = send(
        &mock,
        "/api/getTopTracks?time_range=long_term&offset=50&limit=50",
        Some("ci_access_token=user-token"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 30);
    assert_eq!(body["items"][0]["id"], "track50");
    assert!(body["next"].is_null());

    assert_eq!(mock.recorder.api_auth.lock().unwrap()[0], "Bearer user-token");
    let query = mock.recorder.track_queries.lock().unwrap()[0].clone();
    assert_eq!(query["time_range"], "long_term");
    assert_eq!(query["offset"], "50");
    assert_eq!(query["limit"], "50");
}

#[tokio::test]
async fn test_proxy_applies_default_query() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    let response = send(&mock, "/api/getTopTracks", Some("ci_access_token=tok")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let query = mock.recorder.track_queries.lock().unwrap()[0].clone();
    assert_eq!(query["time_range"], "short_term");
    assert_eq!(query["offset"], "0");
    assert_eq!(query["limit"], "20");
}

#[tokio::test]
async fn test_proxy_upstream_failure_returns_error_envelope() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    mock.recorder.fail_tracks(StatusCode::UNAUTHORIZED);

    let response = send(&mock, "/api/getTopTracks", Some("ci_access_token=stale")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": { "message": TOP_TRACKS_ERROR } })
    );
}

#[tokio::test]
async fn test_proxy_source_reads_pages_through_server() {
    let mock = MockSpotify::start(distinct_tracks(60)).await;
    let base_url = serve_app(&mock).await;
    let source = ProxyTrackSource::new(reqwest::Client::new(), base_url, "cli-token");

    let page: TopTracksPage = source
        .fetch_page(TimeRange::MediumTerm, 0, 50)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 50);
    assert!(page.next.is_some());

    assert_eq!(mock.recorder.api_auth.lock().unwrap()[0], "Bearer cli-token");
    assert_eq!(
        mock.recorder.track_queries.lock().unwrap()[0]["time_range"],
        "medium_term"
    );
}

#[tokio::test]
async fn test_proxy_source_builds_full_collage() {
    let mock = MockSpotify::start(distinct_tracks(120)).await;
    let base_url = serve_app(&mock).await;
    let source = ProxyTrackSource::new(reqwest::Client::new(), base_url, "cli-token");

    let config = CollageConfig {
        size: 10,
        sort_by: SortKey::MostPlayed,
        ..CollageConfig::default()
    };
    let collage = collage::build_collage(&source, &config).await.unwrap();

    assert_eq!(collage.tracks.len(), 100);
    assert_eq!(collage.grid.cells.len(), 100);
    assert_eq!(mock.recorder.api_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_proxy_source_reports_expired_token() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    mock.recorder.fail_tracks(StatusCode::UNAUTHORIZED);
    let base_url = serve_app(&mock).await;
    let source = ProxyTrackSource::new(reqwest::Client::new(), base_url, "stale");

    let result = collage::build_collage(&source, &CollageConfig::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_proxy_malformed_query_returns_error_envelope() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    let response = send(
        &mock,
        "/api/getTopTracks?offset=abc",
        Some("ci_access_token=tok"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": { "message": TOP_TRACKS_ERROR } })
    );
    assert_eq!(mock.recorder.total_calls(), 0);
}

#[tokio::test]
async fn test_proxy_malformed_query_without_token_reports_missing_token() {
    let mock = MockSpotify::start(distinct_tracks(5)).await;
    let response = send(&mock, "/api/getTopTracks?limit=many", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Token not found" }));
}
