//! # API Module
//!
//! HTTP surface of Collageify, built on [Axum](https://docs.rs/axum).
//!
//! ## Endpoints
//!
//! | Route | Auth | Handler |
//! |---|---|---|
//! | `GET /` | none | [`pages::index`] |
//! | `GET /login` | none | [`auth::login`] |
//! | `GET /callback` | state cookie | [`auth::callback`] |
//! | `GET /create` | token cookie | [`pages::create`] |
//! | `GET /create/export` | token cookie | [`pages::export`] |
//! | `GET /logout` | none | [`auth::logout`] |
//! | `GET /api/getTopTracks` | token cookie | [`tracks::get_top_tracks`] |
//! | `GET /images/*` | none | static files under `public/images` |
//!
//! ## Cookies
//!
//! - `spotify-state` - CSRF state of a pending login, cleared by the callback
//! - `ci_access_token` - upstream access token, httpOnly, Secure, 30 minutes
//!
//! The access-token cookie is the only server-side authorization artifact.
//! There is no session store: logging out drops the cookie and nothing else.

pub mod auth;
pub mod pages;
pub mod tracks;

use std::sync::Arc;

use axum::{Router, routing::get};
use reqwest::Client;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;

pub use auth::{STATE_COOKIE, TOKEN_COOKIE};

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: Client::new(),
        }
    }
}

/// Assembles the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
        .route("/create", get(pages::create))
        .route("/create/export", get(pages::export))
        .route("/api/getTopTracks", get(tracks::get_top_tracks))
        .nest_service("/images", ServeDir::new("public/images"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
