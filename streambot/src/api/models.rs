//! API request and response models (DTOs).
//!
//! This module defines the data transfer objects for all API endpoints.
//! Field names are camelCase on the wire.
//!
//! # Model Categories
//!
//! - **Streamer**: channel registration and listing
//! - **Configuration**: bot configuration with masked secrets
//! - **Activity**: the activity log
//! - **Bot**: start/stop and notification endpoints
//! - **Health**: liveness

use chrono::{DateTime, Utc};
use platforms_status::Platform;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ActivityEvent, BotConfiguration, Channel, ConfigurationUpdate, NewChannel, NotificationRecord,
};
use crate::{Error, Result};

// ============================================================================
// Streamer
// ============================================================================

/// Request body for `POST /api/streamers`.
///
/// `username` may also be a channel page URL, in which case `platform` is
/// optional and taken from the URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamerRequest {
    #[serde(default)]
    pub platform: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub custom_message: Option<String>,
}

impl CreateStreamerRequest {
    /// Resolve the platform and username into a [`NewChannel`].
    ///
    /// The display name defaults to the username.
    pub fn into_new_channel(self) -> Result<NewChannel> {
        let (platform, username) = match Platform::parse_channel_url(&self.username) {
            Ok(channel) => (channel.platform, channel.username),
            Err(_) => {
                let platform = self
                    .platform
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| Error::validation("platform is required"))?;
                let platform = platform
                    .parse::<Platform>()
                    .map_err(|_| Error::validation(format!("unsupported platform '{platform}'")))?;
                (platform, self.username)
            }
        };

        let display_name = self
            .display_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| username.trim().to_string());

        Ok(NewChannel {
            platform,
            username,
            display_name,
            custom_message: self.custom_message,
        })
    }
}

/// A monitored channel with its last known status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamerResponse {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    pub custom_message: Option<String>,
    pub is_live: bool,
    pub last_live_at: Option<DateTime<Utc>>,
    pub viewer_count: u64,
    pub category: Option<String>,
    pub stream_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Channel> for StreamerResponse {
    fn from(channel: Channel) -> Self {
        let url = channel.url();
        Self {
            id: channel.id,
            platform: channel.platform,
            username: channel.username,
            display_name: channel.display_name,
            custom_message: channel.custom_message,
            is_live: channel.is_live,
            last_live_at: channel.last_live_at,
            viewer_count: channel.viewer_count,
            category: channel.category,
            stream_title: channel.stream_title,
            thumbnail_url: channel.thumbnail_url,
            url,
            created_at: channel.created_at,
        }
    }
}

/// Result of `DELETE /api/streamers/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveStreamerResponse {
    pub success: bool,
    pub notifications_deleted: usize,
    pub notifications_failed: usize,
}

// ============================================================================
// Configuration
// ============================================================================

/// Bot configuration as returned by the API, secrets masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResponse {
    pub check_interval: u64,
    pub default_message: String,
    pub discord_bot_token: Option<String>,
    pub discord_channel_id: Option<String>,
    pub discord_server_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl From<&BotConfiguration> for ConfigurationResponse {
    fn from(config: &BotConfiguration) -> Self {
        let masked = config.masked();
        Self {
            check_interval: masked.check_interval(),
            default_message: masked.default_message,
            discord_bot_token: masked.discord_bot_token,
            discord_channel_id: masked.discord_channel_id,
            discord_server_id: masked.discord_server_id,
            twitch_client_id: masked.twitch_client_id,
            twitch_client_secret: masked.twitch_client_secret,
            youtube_api_key: masked.youtube_api_key,
        }
    }
}

/// Request body for `POST /api/configuration`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigurationRequest {
    pub check_interval: Option<u64>,
    pub default_message: Option<String>,
    pub discord_bot_token: Option<String>,
    pub discord_channel_id: Option<String>,
    pub discord_server_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl From<UpdateConfigurationRequest> for ConfigurationUpdate {
    fn from(request: UpdateConfigurationRequest) -> Self {
        Self {
            check_interval_secs: request.check_interval,
            default_message: request.default_message,
            discord_bot_token: request.discord_bot_token,
            discord_channel_id: request.discord_channel_id,
            discord_server_id: request.discord_server_id,
            twitch_client_id: request.twitch_client_id,
            twitch_client_secret: request.twitch_client_secret,
            youtube_api_key: request.youtube_api_key,
        }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Default number of activity events returned by `GET /api/logs`.
pub const DEFAULT_LOG_LIMIT: u32 = 50;

/// Largest `limit` accepted by `GET /api/logs`.
pub const MAX_LOG_LIMIT: u32 = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u32>,
}

impl LogsQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LOG_LIMIT)
            .clamp(1, MAX_LOG_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEventResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityEvent> for ActivityEventResponse {
    fn from(event: ActivityEvent) -> Self {
        Self {
            id: event.id,
            kind: event.kind.to_string(),
            message: event.message,
            details: event.details,
            timestamp: event.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearLogsResponse {
    pub success: bool,
    pub deleted: u64,
}

// ============================================================================
// Bot
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatusResponse {
    pub monitoring_active: bool,
    pub bot_connected: bool,
    pub bot_user: Option<String>,
    pub check_interval: Option<u64>,
}

/// Request body for `POST /api/test-notification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    pub streamer_id: String,
}

/// An outstanding notification message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecordResponse {
    pub id: String,
    pub streamer_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRecord> for NotificationRecordResponse {
    fn from(record: NotificationRecord) -> Self {
        Self {
            id: record.id,
            streamer_id: record.channel_id,
            channel_id: record.destination_id,
            message_id: record.message_id,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}
