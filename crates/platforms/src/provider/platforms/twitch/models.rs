use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the client-credentials grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[allow(dead_code)]
    pub token_type: String,
}

/// Envelope shared by every Helix list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct HelixResponse<T> {
    pub data: Vec<T>,
}

/// A Helix error body.
#[derive(Debug, Deserialize)]
pub(crate) struct HelixError {
    #[serde(default)]
    pub message: String,
}

/// An entry of `GET /helix/streams`.
#[derive(Debug, Deserialize)]
pub(crate) struct HelixStream {
    #[allow(dead_code)]
    pub user_login: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: u64,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnail_url: String,
}
