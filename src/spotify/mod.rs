//! # Spotify Integration Module
//!
//! Thin wrappers around the handful of Spotify endpoints Collageify talks to.
//! Every function takes the base URLs from [`crate::config::Config`] so tests
//! can point them at a local mock.
//!
//! ## Endpoints
//!
//! - `GET  {accounts}/authorize` - [`auth::authorize_url`] builds the redirect
//! - `POST {accounts}/api/token` - [`auth::exchange_code`], HTTP Basic client auth
//! - `GET  {api}/me` - [`profile::get_profile`]
//! - `GET  {api}/me/top/tracks` - [`tracks::get_top_tracks_raw`] and [`tracks::get_top_tracks`]
//!
//! ## Error Handling
//!
//! Only an HTTP 200 counts as success. Anything else, including other 2xx
//! codes, becomes [`UpstreamError::Status`]. There are no retries: every
//! failure is terminal for the request that triggered it.

pub mod auth;
pub mod profile;
pub mod tracks;

use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with {0}")]
    Status(StatusCode),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Rejects every response that is not exactly `200 OK`.
pub(crate) fn require_ok(response: Response) -> Result<Response, UpstreamError> {
    match response.status() {
        StatusCode::OK => Ok(response),
        status => Err(UpstreamError::Status(status)),
    }
}
