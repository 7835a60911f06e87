//! Configuration management for Collageify.
//!
//! Configuration is read from environment variables, optionally seeded from
//! `.env` files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/collageify/.env`)
//! 4. The defaults documented on [`Config`]
//!
//! Only the Spotify client secret has no default.

use std::{env, path::PathBuf};

use thiserror::Error;

/// Space-separated OAuth scopes requested at login.
pub const SPOTIFY_SCOPE: &str = "user-read-private user-read-email user-top-read";

pub const DEFAULT_APP_NAME: &str = "Collageify";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Loads `.env` files into the process environment.
///
/// Both files are optional. The working-directory file wins over the one in
/// the local data directory because `dotenv` never overrides variables that
/// are already set.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let _ = dotenv::dotenv();

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("collageify/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Runtime configuration of the web server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shown in page titles. `APP_NAME`, default `Collageify`.
    pub app_name: String,
    /// Public origin of this app, used to build the OAuth redirect target.
    /// `BASE_URL`, default `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Bind address. `HOST`, default `127.0.0.1`.
    pub host: String,
    /// Bind port. `PORT`, default `8080`.
    pub port: u16,
    /// `SPOTIFY_CLIENT_ID`, default empty.
    pub client_id: String,
    /// `SPOTIFY_CLIENT_SECRET`, required.
    pub client_secret: String,
    /// Base of the authorize and token endpoints.
    /// `SPOTIFY_ACCOUNTS_URL`, default `https://accounts.spotify.com`.
    pub accounts_url: String,
    /// Base of the Web API. `SPOTIFY_API_URL`, default `https://api.spotify.com/v1`.
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            client_id: String::new(),
            client_secret: String::new(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if `SPOTIFY_CLIENT_SECRET` is unset or `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            Err(_) => defaults.port,
        };

        let client_secret = env::var("SPOTIFY_CLIENT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SPOTIFY_CLIENT_SECRET"))?;

        Ok(Self {
            app_name: env_or("APP_NAME", defaults.app_name),
            base_url: trim_slash(env_or("BASE_URL", defaults.base_url)),
            host: env_or("HOST", defaults.host),
            port,
            client_id: env_or("SPOTIFY_CLIENT_ID", defaults.client_id),
            client_secret,
            accounts_url: trim_slash(env_or("SPOTIFY_ACCOUNTS_URL", defaults.accounts_url)),
            api_url: trim_slash(env_or("SPOTIFY_API_URL", defaults.api_url)),
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.base_url)
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the command-line collage client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin of a running Collageify server. `BASE_URL`.
    pub base_url: String,
    /// Value of the `ci_access_token` cookie. `CI_ACCESS_TOKEN`.
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: trim_slash(env_or("BASE_URL", DEFAULT_BASE_URL.to_string())),
            token: env::var("CI_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
