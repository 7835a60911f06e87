use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{UpstreamError, require_ok};
use crate::types::TopTracksPage;

/// Query parameters of `GET /me/top/tracks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTracksQuery {
    pub time_range: String,
    pub offset: u32,
    pub limit: u32,
}

impl Default for TopTracksQuery {
    fn default() -> Self {
        Self {
            time_range: "short_term".to_string(),
            offset: 0,
            limit: 20,
        }
    }
}

/// Fetches one page of the user's top tracks and returns the body untouched.
///
/// # Errors
///
/// Transport failures and any status other than 200.
pub async fn get_top_tracks_raw(
    client: &Client,
    api_url: &str,
    token: &str,
    query: &TopTracksQuery,
) -> Result<String, UpstreamError> {
    let response = client
        .get(format!("{api_url}/me/top/tracks"))
        .bearer_auth(token)
        .query(query)
        .send()
        .await?;

    Ok(require_ok(response)?.text().await?)
}

/// Fetches and decodes one page of the user's top tracks.
///
/// # Errors
///
/// Everything [`get_top_tracks_raw`] reports, plus undecodable bodies.
pub async fn get_top_tracks(
    client: &Client,
    api_url: &str,
    token: &str,
    query: &TopTracksQuery,
) -> Result<TopTracksPage, UpstreamError> {
    let body = get_top_tracks_raw(client, api_url, token, query).await?;
    serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(format!("top tracks: {e}")))
}
