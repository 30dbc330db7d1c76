use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use crate::status::{Platform, StreamStatus};

/// API credentials for every supported platform.
///
/// Providers pick the fields they need and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

/// Answers whether a channel on one platform is live.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// The platform served by this provider.
    fn platform(&self) -> Platform;

    /// Replace the credentials used for subsequent queries.
    fn configure(&self, credentials: &ProviderCredentials);

    /// Query the current status of `username`.
    async fn query(&self, username: &str) -> Result<StreamStatus, ProviderError>;
}

/// Trim a credential, treating blank strings as absent.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
