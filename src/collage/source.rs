use std::future::Future;

use reqwest::{Client, header::COOKIE};

use super::{CollageError, TimeRange};
use crate::{
    api::TOKEN_COOKIE,
    spotify::{
        self, require_ok,
        tracks::{self, TopTracksQuery},
    },
    types::TopTracksPage,
};

/// Where the pipeline gets its pages of top tracks from.
pub trait TrackSource {
    fn fetch_page(
        &self,
        time_range: TimeRange,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<TopTracksPage, CollageError>> + Send;
}

/// Reads pages through a running Collageify server's `/api/getTopTracks`,
/// authenticating with the access-token cookie the way a browser would.
#[derive(Debug, Clone)]
pub struct ProxyTrackSource {
    client: Client,
    base_url: String,
    token: String,
}

impl ProxyTrackSource {
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

impl TrackSource for ProxyTrackSource {
    async fn fetch_page(
        &self,
        time_range: TimeRange,
        offset: u32,
        limit: u32,
    ) -> Result<TopTracksPage, CollageError> {
        let query = TopTracksQuery {
            time_range: time_range.to_string(),
            offset,
            limit,
        };

        let response = self
            .client
            .get(format!("{}/api/getTopTracks", self.base_url))
            .header(COOKIE, format!("{TOKEN_COOKIE}={}", self.token))
            .query(&query)
            .send()
            .await
            .map_err(spotify::UpstreamError::from)?;

        let body = require_ok(response)?
            .text()
            .await
            .map_err(spotify::UpstreamError::from)?;

        serde_json::from_str(&body).map_err(|e| {
            CollageError::Fetch(spotify::UpstreamError::Decode(format!("top tracks: {e}")))
        })
    }
}

/// Reads pages straight from the Spotify Web API with a known access token.
#[derive(Debug, Clone)]
pub struct UpstreamTrackSource {
    client: Client,
    api_url: String,
    token: String,
}

impl UpstreamTrackSource {
    pub fn new(client: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
        }
    }
}

impl TrackSource for UpstreamTrackSource {
    async fn fetch_page(
        &self,
        time_range: TimeRange,
        offset: u32,
        limit: u32,
    ) -> Result<TopTracksPage, CollageError> {
        let query = TopTracksQuery {
            time_range: time_range.to_string(),
            offset,
            limit,
        };
        Ok(tracks::get_top_tracks(&self.client, &self.api_url, &self.token, &query).await?)
    }
}
