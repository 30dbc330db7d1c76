use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::models::{HelixError, HelixResponse, HelixStream, TokenResponse};
use crate::provider::error::ProviderError;
use crate::provider::status_provider::{ProviderCredentials, StatusProvider, non_empty};
use crate::status::{Platform, StreamStatus};

/// Thumbnail size substituted into Helix thumbnail templates.
const THUMBNAIL_WIDTH: &str = "320";
const THUMBNAIL_HEIGHT: &str = "180";

/// Tokens are refreshed this long before Twitch says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct TwitchCredentials {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_at: Instant,
}

impl AppToken {
    fn is_valid(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Twitch Helix status provider using an app access token.
pub struct TwitchProvider {
    client: Client,
    credentials: RwLock<Option<TwitchCredentials>>,
    token: Mutex<Option<AppToken>>,
    helix_url: String,
    auth_url: String,
}

impl TwitchProvider {
    const HELIX_URL: &str = "https://api.twitch.tv/helix";
    const AUTH_URL: &str = "https://id.twitch.tv/oauth2/token";

    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, Self::HELIX_URL, Self::AUTH_URL)
    }

    /// Create a provider talking to custom Helix and OAuth endpoints.
    pub fn with_endpoints(
        client: Client,
        helix_url: impl Into<String>,
        auth_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials: RwLock::new(None),
            token: Mutex::new(None),
            helix_url: helix_url.into(),
            auth_url: auth_url.into(),
        }
    }

    fn credentials(&self) -> Result<TwitchCredentials, ProviderError> {
        self.credentials
            .read()
            .clone()
            .ok_or(ProviderError::MissingCredentials("Twitch API credentials"))
    }

    async fn authenticate(&self, credentials: &TwitchCredentials) -> Result<AppToken, ProviderError> {
        let response = self
            .client
            .post(&self.auth_url)
            .query(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Twitch API authentication failed");
            return Err(ProviderError::Authentication(format!("{status} - {body}")));
        }

        let token: TokenResponse = response.json().await?;
        info!(expires_in = token.expires_in, "Twitch API authentication successful");
        Ok(AppToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    /// Return a valid access token, authenticating when none is cached.
    async fn access_token(&self, credentials: &TwitchCredentials) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }
        let token = self.authenticate(credentials).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    async fn get_stream(&self, username: &str) -> Result<Option<HelixStream>, ProviderError> {
        let credentials = self.credentials()?;
        let url = format!("{}/streams", self.helix_url);

        // One retry after a 401: the cached token may have been revoked.
        for attempt in 0..2 {
            let token = self.access_token(&credentials).await?;
            let response = self
                .client
                .get(&url)
                .query(&[("user_login", username)])
                .header("Client-ID", &credentials.client_id)
                .bearer_auth(&token)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && attempt == 0 {
                debug!(username, "Twitch token rejected, re-authenticating");
                self.invalidate_token().await;
                continue;
            }
            if !status.is_success() {
                let message = response
                    .json::<HelixError>()
                    .await
                    .map(|e| e.message)
                    .unwrap_or_default();
                return Err(ProviderError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: HelixResponse<HelixStream> = response.json().await?;
            return Ok(body.data.into_iter().next());
        }

        Err(ProviderError::Authentication(
            "access token rejected after refresh".to_string(),
        ))
    }

    /// Fill the `{width}x{height}` placeholders of a Helix thumbnail template.
    pub(crate) fn thumbnail(template: &str) -> String {
        template
            .replace("{width}", THUMBNAIL_WIDTH)
            .replace("{height}", THUMBNAIL_HEIGHT)
    }

    fn to_status(stream: Option<HelixStream>) -> StreamStatus {
        match stream {
            Some(stream) => StreamStatus::live()
                .title(stream.title)
                .category(stream.game_name)
                .viewer_count(stream.viewer_count)
                .thumbnail_url(Self::thumbnail(&stream.thumbnail_url))
                .started_at(stream.started_at)
                .build(),
            None => StreamStatus::offline(),
        }
    }
}

#[async_trait]
impl StatusProvider for TwitchProvider {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    fn configure(&self, credentials: &ProviderCredentials) {
        let next = match (
            non_empty(credentials.twitch_client_id.as_ref()),
            non_empty(credentials.twitch_client_secret.as_ref()),
        ) {
            (Some(client_id), Some(client_secret)) => Some(TwitchCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let mut current = self.credentials.write();
        if *current != next {
            debug!("Twitch credentials changed, dropping cached token");
            *current = next;
            // A token minted for the old client id is useless now.
            if let Ok(mut token) = self.token.try_lock() {
                token.take();
            }
        }
    }

    async fn query(&self, username: &str) -> Result<StreamStatus, ProviderError> {
        let stream = self.get_stream(username).await?;
        debug!(username, live = stream.is_some(), "Twitch status fetched");
        Ok(Self::to_status(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::default_client;

    #[test]
    fn test_thumbnail_template() {
        assert_eq!(
            TwitchProvider::thumbnail("https://cdn/live_user_alice-{width}x{height}.jpg"),
            "https://cdn/live_user_alice-320x180.jpg"
        );
    }

    #[test]
    fn test_offline_status() {
        let status = TwitchProvider::to_status(None);
        assert!(!status.is_live);
    }

    #[tokio::test]
    async fn test_query_without_credentials_fails_fast() {
        let provider = TwitchProvider::new(default_client());
        let err = provider.query("alice").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials(_)));

        // A secret alone is not enough.
        provider.configure(&ProviderCredentials {
            twitch_client_secret: Some("secret".into()),
            ..Default::default()
        });
        let err = provider.query("alice").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials(_)));
    }

    #[test]
    fn test_configure_trims_blank_values() {
        let provider = TwitchProvider::new(default_client());
        provider.configure(&ProviderCredentials {
            twitch_client_id: Some("  ".into()),
            twitch_client_secret: Some("secret".into()),
            ..Default::default()
        });
        assert!(provider.credentials().is_err());

        provider.configure(&ProviderCredentials {
            twitch_client_id: Some("id".into()),
            twitch_client_secret: Some("secret".into()),
            ..Default::default()
        });
        assert_eq!(provider.credentials().unwrap().client_id, "id");
    }
}
