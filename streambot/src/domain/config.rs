//! Runtime bot configuration.

use platforms_status::ProviderCredentials;
use serde::{Deserialize, Serialize};

/// Shortest allowed polling interval in seconds.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 30;

/// Longest allowed polling interval in seconds.
pub const MAX_CHECK_INTERVAL_SECS: u64 = 3600;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Template used when a channel has no custom message.
pub const DEFAULT_MESSAGE: &str = "🔴 {streamer} is now live! 🔴";

/// Placeholder replaced by the channel's display name.
pub const STREAMER_PLACEHOLDER: &str = "{streamer}";

/// Value returned in place of secrets.
pub const MASKED_SECRET: &str = "***";

/// Clamp a polling interval into the allowed range.
pub fn clamp_interval(secs: u64) -> u64 {
    secs.clamp(MIN_CHECK_INTERVAL_SECS, MAX_CHECK_INTERVAL_SECS)
}

/// The singleton bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfiguration {
    pub check_interval_secs: u64,
    pub default_message: String,
    pub discord_bot_token: Option<String>,
    /// Text channel notifications are posted to.
    pub discord_channel_id: Option<String>,
    /// Informational only.
    pub discord_server_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl Default for BotConfiguration {
    fn default() -> Self {
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            default_message: DEFAULT_MESSAGE.to_string(),
            discord_bot_token: None,
            discord_channel_id: None,
            discord_server_id: None,
            twitch_client_id: None,
            twitch_client_secret: None,
            youtube_api_key: None,
        }
    }
}

impl BotConfiguration {
    /// Polling interval after clamping.
    pub fn check_interval(&self) -> u64 {
        clamp_interval(self.check_interval_secs)
    }

    pub fn has_discord_token(&self) -> bool {
        self.discord_bot_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Credentials handed to the status providers.
    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials {
            twitch_client_id: self.twitch_client_id.clone(),
            twitch_client_secret: self.twitch_client_secret.clone(),
            youtube_api_key: self.youtube_api_key.clone(),
        }
    }

    /// Copy with every secret replaced by [`MASKED_SECRET`].
    pub fn masked(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| MASKED_SECRET.to_string());
        Self {
            discord_bot_token: mask(&self.discord_bot_token),
            twitch_client_secret: mask(&self.twitch_client_secret),
            youtube_api_key: mask(&self.youtube_api_key),
            ..self.clone()
        }
    }
}

/// A partial configuration update.
///
/// `None` leaves a field unchanged. For optional fields an empty string clears
/// the stored value, and the masked placeholder is ignored so a client can
/// send back what it read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationUpdate {
    pub check_interval_secs: Option<u64>,
    pub default_message: Option<String>,
    pub discord_bot_token: Option<String>,
    pub discord_channel_id: Option<String>,
    pub discord_server_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl ConfigurationUpdate {
    /// Apply onto `current`, returning the new configuration.
    pub fn apply_to(self, current: &BotConfiguration) -> BotConfiguration {
        fn merge(current: &Option<String>, update: Option<String>) -> Option<String> {
            match update {
                None => current.clone(),
                Some(v) if v == MASKED_SECRET => current.clone(),
                Some(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
            }
        }

        BotConfiguration {
            check_interval_secs: self
                .check_interval_secs
                .map(clamp_interval)
                .unwrap_or(current.check_interval_secs),
            default_message: self
                .default_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| current.default_message.clone()),
            discord_bot_token: merge(&current.discord_bot_token, self.discord_bot_token),
            discord_channel_id: merge(&current.discord_channel_id, self.discord_channel_id),
            discord_server_id: merge(&current.discord_server_id, self.discord_server_id),
            twitch_client_id: merge(&current.twitch_client_id, self.twitch_client_id),
            twitch_client_secret: merge(&current.twitch_client_secret, self.twitch_client_secret),
            youtube_api_key: merge(&current.youtube_api_key, self.youtube_api_key),
        }
    }
}
