use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use rand::Rng;
use uuid::Uuid;

/// Length of the OAuth state token in hex characters.
pub const STATE_TOKEN_LEN: usize = 16;

/// Returns a random hex string used as the OAuth `state` parameter.
pub fn generate_state_token() -> String {
    let bytes: [u8; STATE_TOKEN_LEN / 2] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Builds an HTTP Basic `Authorization` header value.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {credentials}")
}

/// First whitespace-separated word of a display name, or an empty string.
pub fn first_name(display_name: Option<&str>) -> String {
    display_name
        .and_then(|name| name.split_whitespace().next())
        .unwrap_or_default()
        .to_string()
}

/// Parses a Spotify release date of `year`, `month` or `day` precision.
///
/// Partial dates are anchored to the first day of the period.
pub fn parse_release_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    match date.len() {
        4 => NaiveDate::parse_from_str(&format!("{date}-01-01"), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
    }
}

/// Random download name for an exported collage.
pub fn export_file_name(extension: &str) -> String {
    format!("collageify-{}.{extension}", Uuid::new_v4())
}
