use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use super::{AppState, auth::access_token};
use crate::spotify::{
    UpstreamError,
    tracks::{self, TopTracksQuery},
};

pub const TOP_TRACKS_ERROR: &str = "There was an error fetching top tracks.";

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("token not found")]
    MissingToken,
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match self {
            ProxyError::MissingToken => json!({ "error": "Token not found" }),
            ProxyError::InvalidQuery(_) | ProxyError::Upstream(_) => {
                json!({ "error": { "message": TOP_TRACKS_ERROR } })
            }
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopTracksParams {
    pub time_range: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl From<TopTracksParams> for TopTracksQuery {
    fn from(params: TopTracksParams) -> Self {
        let defaults = TopTracksQuery::default();
        Self {
            time_range: params.time_range.unwrap_or(defaults.time_range),
            offset: params.offset.unwrap_or(defaults.offset),
            limit: params.limit.unwrap_or(defaults.limit),
        }
    }
}

/// `GET /api/getTopTracks` - forward to `/me/top/tracks` with the cookie's
/// token as bearer credential and relay the body as is.
pub async fn get_top_tracks(
    State(state): State<AppState>,
    jar: CookieJar,
    params: Result<Query<TopTracksParams>, QueryRejection>,
) -> Result<Response, ProxyError> {
    let token = access_token(&jar).ok_or(ProxyError::MissingToken)?;
    let Query(params) =
        params.inspect_err(|e| warn!(error = %e, "rejected top tracks query"))?;
    let query = TopTracksQuery::from(params);

    let body = tracks::get_top_tracks_raw(&state.http, &state.config.api_url, &token, &query)
        .await
        .inspect_err(|e| warn!(error = %e, offset = query.offset, "top tracks proxy failed"))?;

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}
