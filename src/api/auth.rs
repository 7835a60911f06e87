//! OAuth2 authorization-code flow: login redirect, CSRF-checked callback,
//! token cookie, logout and the route guard.

use axum::{
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use thiserror::Error;
use time::Duration;
use tracing::{error, info, warn};

use super::AppState;
use crate::{
    spotify::{self, UpstreamError},
    utils,
};

pub const STATE_COOKIE: &str = "spotify-state";
pub const TOKEN_COOKIE: &str = "ci_access_token";

/// Lifetime of the access-token cookie.
pub const TOKEN_MAX_AGE: Duration = Duration::minutes(30);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("oauth state mismatch")]
    StateMismatch,
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("token exchange failed: {0}")]
    Exchange(#[from] UpstreamError),
    #[error("invalid authorize url: {0}")]
    AuthorizeUrl(#[from] url::ParseError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::StateMismatch => {
                (StatusCode::FORBIDDEN, "Potential CSRF detected").into_response()
            }
            AuthError::Denied(_) | AuthError::Exchange(_) => (
                StatusCode::BAD_GATEWAY,
                "There was an error during authentication.",
            )
                .into_response(),
            AuthError::AuthorizeUrl(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error").into_response()
            }
        }
    }
}

/// Access token taken from the `ci_access_token` cookie.
///
/// Use as a handler parameter to guard a page; requests without the cookie
/// are redirected to the landing page.
#[derive(Debug, Clone)]
pub struct RequireToken(pub String);

impl<S> FromRequestParts<S> for RequireToken
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        access_token(&jar).map(Self).ok_or_else(|| Redirect::to("/"))
    }
}

/// Non-empty value of the access-token cookie.
pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// True only when both values are present, non-empty and identical.
pub fn state_matches(expected: Option<&str>, returned: Option<&str>) -> bool {
    matches!((expected, returned), (Some(e), Some(r)) if !e.is_empty() && e == r)
}

fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(TOKEN_MAX_AGE)
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .build()
}

/// `GET /login` - store a fresh CSRF state and redirect to Spotify.
pub async fn login(State(state): State<AppState>) -> Result<(CookieJar, Redirect), AuthError> {
    let oauth_state = utils::generate_state_token();
    let url = spotify::auth::authorize_url(&state.config, &oauth_state)?;

    let cookie = Cookie::build((STATE_COOKIE, oauth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((CookieJar::new().add(cookie), Redirect::to(url.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /callback` - verify state, exchange the code, set the token cookie.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let expected = jar.get(STATE_COOKIE).map(Cookie::value);
    if !state_matches(expected, params.state.as_deref()) {
        warn!("oauth state mismatch, refusing callback");
        return AuthError::StateMismatch.into_response();
    }

    // The state is single use from here on, whatever the outcome.
    let jar = jar.add(expired_cookie(STATE_COOKIE));

    if let Some(reason) = params.error {
        warn!(reason = %reason, "authorization denied upstream");
        return (jar, AuthError::Denied(reason)).into_response();
    }

    let code = params.code.unwrap_or_default();
    match spotify::auth::exchange_code(&state.http, &state.config, &code).await {
        Ok(token) => {
            info!("user authenticated");
            (jar.add(token_cookie(token)), Redirect::to("/create")).into_response()
        }
        Err(e) => {
            error!(error = %e, "oauth code exchange failed");
            (jar, AuthError::Exchange(e)).into_response()
        }
    }
}

/// `GET /logout` - forget the token locally. The Spotify session is left alone.
pub async fn logout() -> (CookieJar, Redirect) {
    (
        CookieJar::new().add(expired_cookie(TOKEN_COOKIE)),
        Redirect::to("/"),
    )
}
