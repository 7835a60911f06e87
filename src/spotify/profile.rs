use reqwest::Client;

use super::{UpstreamError, require_ok};
use crate::types::Profile;

/// Fetches the current user's profile (`GET /me`).
pub async fn get_profile(client: &Client, api_url: &str, token: &str) -> Result<Profile, UpstreamError> {
    let response = client
        .get(format!("{api_url}/me"))
        .bearer_auth(token)
        .send()
        .await?;

    require_ok(response)?
        .json::<Profile>()
        .await
        .map_err(|e| UpstreamError::Decode(format!("profile: {e}")))
}
