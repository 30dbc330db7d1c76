//! Channel database model.

use std::str::FromStr;

use platforms_status::Platform;
use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::domain::Channel;
use crate::{Error, Result};

#[derive(Debug, Clone, FromRow)]
pub struct ChannelDbModel {
    pub id: String,
    /// Lowercase platform name (`twitch`, `youtube`).
    pub platform: String,
    pub username: String,
    pub display_name: String,
    pub custom_message: Option<String>,
    pub is_live: bool,
    /// Unix epoch milliseconds (UTC) of the last live read.
    pub last_live_at: Option<i64>,
    pub viewer_count: i64,
    pub category: Option<String>,
    pub stream_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChannelDbModel {
    pub fn from_domain(channel: &Channel, updated_at: i64) -> Self {
        Self {
            id: channel.id.clone(),
            platform: channel.platform.to_string(),
            username: channel.username.clone(),
            display_name: channel.display_name.clone(),
            custom_message: channel.custom_message.clone(),
            is_live: channel.is_live,
            last_live_at: channel.last_live_at.map(datetime_to_ms),
            viewer_count: i64::try_from(channel.viewer_count).unwrap_or(i64::MAX),
            category: channel.category.clone(),
            stream_title: channel.stream_title.clone(),
            thumbnail_url: channel.thumbnail_url.clone(),
            created_at: datetime_to_ms(channel.created_at),
            updated_at,
        }
    }
}

impl TryFrom<ChannelDbModel> for Channel {
    type Error = Error;

    fn try_from(row: ChannelDbModel) -> Result<Self> {
        let platform = Platform::from_str(&row.platform).map_err(|_| {
            Error::Other(format!(
                "channel {} has unknown platform '{}'",
                row.id, row.platform
            ))
        })?;

        Ok(Channel {
            id: row.id,
            platform,
            username: row.username,
            display_name: row.display_name,
            custom_message: row.custom_message,
            is_live: row.is_live,
            last_live_at: row.last_live_at.map(ms_to_datetime),
            viewer_count: u64::try_from(row.viewer_count).unwrap_or(0),
            category: row.category,
            stream_title: row.stream_title,
            thumbnail_url: row.thumbnail_url,
            created_at: ms_to_datetime(row.created_at),
        })
    }
}
