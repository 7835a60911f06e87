use reqwest::{Client, header::AUTHORIZATION};
use tracing::debug;
use url::Url;

use super::{UpstreamError, require_ok};
use crate::{
    config::{Config, SPOTIFY_SCOPE},
    types::TokenResponse,
    utils,
};

/// Builds the authorization URL the browser is redirected to at login.
///
/// Carries `response_type=code`, the client id, the requested scopes, the
/// redirect target and the CSRF `state` token.
///
/// # Errors
///
/// Fails only if the configured accounts URL is not a valid URL.
pub fn authorize_url(config: &Config, state: &str) -> Result<Url, url::ParseError> {
    let redirect_uri = config.redirect_uri();
    Url::parse_with_params(
        &config.authorize_url(),
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("scope", SPOTIFY_SCOPE),
            ("redirect_uri", redirect_uri.as_str()),
            ("state", state),
        ],
    )
}

/// Exchanges an authorization code for an access token.
///
/// The client authenticates with HTTP Basic credentials built from the
/// client id and secret; the form carries the code, the redirect target and
/// `grant_type=authorization_code`. Refresh tokens in the response are
/// ignored.
///
/// # Errors
///
/// Transport failures, any status other than 200 and bodies without an
/// `access_token` are all reported as [`UpstreamError`].
pub async fn exchange_code(
    client: &Client,
    config: &Config,
    code: &str,
) -> Result<String, UpstreamError> {
    let redirect_uri = config.redirect_uri();
    let response = client
        .post(config.token_url())
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(&config.client_id, &config.client_secret),
        )
        .form(&[
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    let body = require_ok(response)?.text().await?;
    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| UpstreamError::Decode(format!("token response: {e}")))?;

    debug!(
        scope = token.scope.as_deref().unwrap_or_default(),
        expires_in = token.expires_in,
        "access token obtained"
    );
    Ok(token.access_token)
}
