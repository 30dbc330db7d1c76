//! Discord bot sink over the REST API.
//!
//! Implements Discord's recommended rate limit handling:
//! - No hardcoded rate limits
//! - Retries on 429 responses respecting the Retry-After header

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::message::OutgoingMessage;
use super::sink::{DeleteOutcome, NotificationSink};
use crate::{Error, Result};

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Maximum attempts for a rate-limited request.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
}

/// The bot account behind the configured token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl BotUser {
    /// `name#1234`, or the bare name for accounts without a discriminator.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

/// Discord notification sink.
///
/// Publishing and deleting only need a token; [`DiscordSink::verify`] tracks
/// whether the bot is considered connected for status reporting.
pub struct DiscordSink {
    client: Client,
    api_base: String,
    token: RwLock<Option<String>>,
    connected: AtomicBool,
    bot_user: RwLock<Option<BotUser>>,
}

impl DiscordSink {
    pub fn new(client: Client) -> Self {
        Self::with_api_base(client, DEFAULT_API_BASE)
    }

    pub fn with_api_base(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            token: RwLock::new(None),
            connected: AtomicBool::new(false),
            bot_user: RwLock::new(None),
        }
    }

    /// Replace the bot token. Returns whether it changed; a change marks the
    /// sink disconnected until verified again.
    pub fn set_token(&self, token: Option<String>) -> bool {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let mut current = self.token.write();
        if *current == token {
            return false;
        }
        *current = token;
        self.disconnect();
        true
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn bot_user(&self) -> Option<BotUser> {
        self.bot_user.read().clone()
    }

    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            info!("Discord bot disconnected");
        }
        self.bot_user.write().take();
    }

    /// Check the token against `GET /users/@me`.
    pub async fn verify(&self) -> Result<BotUser> {
        let url = format!("{}/users/@me", self.api_base);
        let result = async {
            let response = self.send_with_retry(|| self.client.get(&url)).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Self::error_from(status, response).await);
            }
            response
                .json::<BotUser>()
                .await
                .map_err(|e| Error::notification(format!("Invalid Discord user response: {e}")))
        }
        .await;

        match result {
            Ok(user) => {
                info!(bot = %user.tag(), "Discord bot verified");
                *self.bot_user.write() = Some(user.clone());
                self.connected.store(true, Ordering::Release);
                Ok(user)
            }
            Err(e) => {
                self.disconnect();
                Err(e)
            }
        }
    }

    fn token(&self) -> Result<String> {
        self.token
            .read()
            .clone()
            .ok_or_else(|| Error::config("Discord bot token not configured"))
    }

    /// Send a request, retrying on 429 for at most [`MAX_RATE_LIMIT_RETRIES`]
    /// attempts. Any other response is returned to the caller.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.token()?;
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = build()
                .header("Authorization", format!("Bot {token}"))
                .send()
                .await
                .map_err(|e| Error::notification(format!("Discord request failed: {e}")))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let retry_after = parse_retry_after(response.headers());
            if attempts >= MAX_RATE_LIMIT_RETRIES {
                warn!(
                    "Discord rate limit: max retries ({}) exceeded, last retry_after was {:?}",
                    MAX_RATE_LIMIT_RETRIES, retry_after
                );
                return Err(Error::notification(format!(
                    "Discord rate limit exceeded after {MAX_RATE_LIMIT_RETRIES} attempts"
                )));
            }

            let wait_duration = retry_after.unwrap_or(Duration::from_secs(1));
            debug!(
                "Discord rate limited (429), waiting {:?} before retry (attempt {}/{})",
                wait_duration, attempts, MAX_RATE_LIMIT_RETRIES
            );
            tokio::time::sleep(wait_duration).await;
        }
    }

    async fn error_from(status: StatusCode, response: Response) -> Error {
        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body, "Discord request rejected");
        Error::notification(format!("Discord API returned {status}: {body}"))
    }
}

/// Parse the wait duration of a 429 response.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    ["Retry-After", "X-RateLimit-Reset-After"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok()?.trim().parse::<f64>().ok())
        .find(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Request body for `POST /channels/{id}/messages`.
fn build_payload(message: &OutgoingMessage) -> serde_json::Value {
    let embed = &message.embed;
    let fields: Vec<_> = embed
        .fields
        .iter()
        .map(|f| json!({ "name": f.name, "value": f.value, "inline": f.inline }))
        .collect();

    let mut embed_json = json!({
        "title": embed.title,
        "description": embed.description,
        "url": embed.url,
        "color": embed.color,
        "fields": fields,
        "footer": { "text": embed.footer },
        "timestamp": embed.timestamp.to_rfc3339(),
    });
    if let Some(thumbnail) = &embed.thumbnail_url {
        embed_json["thumbnail"] = json!({ "url": thumbnail });
    }

    json!({
        "content": message.content,
        "embeds": [embed_json],
    })
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn publish(&self, destination: &str, message: &OutgoingMessage) -> Result<String> {
        let url = format!("{}/channels/{}/messages", self.api_base, destination);
        let payload = build_payload(message);

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&payload))
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status, response).await);
        }

        let sent: DiscordMessage = response
            .json()
            .await
            .map_err(|e| Error::notification(format!("Invalid Discord message response: {e}")))?;
        debug!(destination, message_id = %sent.id, "Discord message published");
        Ok(sent.id)
    }

    async fn delete(&self, destination: &str, message_id: &str) -> Result<DeleteOutcome> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.api_base, destination, message_id
        );

        let response = self.send_with_retry(|| self.client.delete(&url)).await?;
        let status = response.status();
        if status.is_success() {
            debug!(destination, message_id, "Discord message deleted");
            return Ok(DeleteOutcome::Deleted);
        }
        if status == StatusCode::NOT_FOUND {
            debug!(destination, message_id, "Discord message already gone");
            return Ok(DeleteOutcome::NotFound);
        }
        Err(Self::error_from(status, response).await)
    }
}
