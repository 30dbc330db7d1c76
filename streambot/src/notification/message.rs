//! Live announcement messages.

use chrono::{DateTime, Utc};
use platforms_status::Platform;
use serde::Serialize;

use crate::domain::Channel;
use crate::domain::config::STREAMER_PLACEHOLDER;

pub const TWITCH_COLOR: u32 = 0x9146FF;
pub const YOUTUBE_COLOR: u32 = 0xFF0000;
pub const FOOTER_TEXT: &str = "StreamBot Notification";

/// A message ready to be published: plain content plus one embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub content: String,
    pub embed: Embed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail_url: Option<String>,
    pub footer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }
}

/// Replace every `{streamer}` in `template` with `display_name`.
pub fn render_template(template: &str, display_name: &str) -> String {
    template.replace(STREAMER_PLACEHOLDER, display_name)
}

pub fn platform_color(platform: Platform) -> u32 {
    match platform {
        Platform::Twitch => TWITCH_COLOR,
        Platform::Youtube => YOUTUBE_COLOR,
    }
}

impl OutgoingMessage {
    /// Announcement for `channel` going live.
    ///
    /// The channel's own message wins over `default_template`.
    pub fn live_announcement(channel: &Channel, default_template: &str) -> Self {
        let template = channel
            .custom_message
            .as_deref()
            .unwrap_or(default_template);

        let embed = Embed {
            title: format!("{} is now live!", channel.display_name),
            description: channel
                .stream_title
                .clone()
                .unwrap_or_else(|| "No title".to_string()),
            url: channel.url(),
            color: platform_color(channel.platform),
            fields: vec![
                EmbedField::inline("Platform", channel.platform.display_name()),
                EmbedField::inline(
                    "Game",
                    channel.category.as_deref().unwrap_or("Unknown"),
                ),
                EmbedField::inline("Viewers", channel.viewer_count.to_string()),
            ],
            thumbnail_url: channel.thumbnail_url.clone(),
            footer: FOOTER_TEXT.to_string(),
            timestamp: Utc::now(),
        };

        Self {
            content: render_template(template, &channel.display_name),
            embed,
        }
    }
}
