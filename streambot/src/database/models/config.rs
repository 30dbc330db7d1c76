//! Bot configuration database model.

use sqlx::FromRow;

use crate::domain::BotConfiguration;
use crate::domain::config::clamp_interval;

/// The single `bot_config` row (`id = 1`).
#[derive(Debug, Clone, FromRow)]
pub struct BotConfigDbModel {
    pub check_interval_secs: i64,
    pub default_message: String,
    pub discord_bot_token: Option<String>,
    pub discord_channel_id: Option<String>,
    pub discord_server_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl From<&BotConfiguration> for BotConfigDbModel {
    fn from(config: &BotConfiguration) -> Self {
        Self {
            check_interval_secs: config.check_interval() as i64,
            default_message: config.default_message.clone(),
            discord_bot_token: config.discord_bot_token.clone(),
            discord_channel_id: config.discord_channel_id.clone(),
            discord_server_id: config.discord_server_id.clone(),
            twitch_client_id: config.twitch_client_id.clone(),
            twitch_client_secret: config.twitch_client_secret.clone(),
            youtube_api_key: config.youtube_api_key.clone(),
        }
    }
}

impl From<BotConfigDbModel> for BotConfiguration {
    fn from(row: BotConfigDbModel) -> Self {
        Self {
            check_interval_secs: clamp_interval(u64::try_from(row.check_interval_secs).unwrap_or(0)),
            default_message: row.default_message,
            discord_bot_token: row.discord_bot_token,
            discord_channel_id: row.discord_channel_id,
            discord_server_id: row.discord_server_id,
            twitch_client_id: row.twitch_client_id,
            twitch_client_secret: row.twitch_client_secret,
            youtube_api_key: row.youtube_api_key,
        }
    }
}
