use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::provider::error::ProviderError;

static TWITCH_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.|m\.)?twitch\.tv/([A-Za-z0-9_]+)/?(?:[?#].*)?$")
        .expect("twitch url regex is valid")
});

static YOUTUBE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(?:www\.|m\.)?youtube\.com/(?:channel/|c/|user/)?(@?[A-Za-z0-9_.\-]+)/?(?:live/?)?(?:[?#].*)?$",
    )
    .expect("youtube url regex is valid")
});

/// A supported streaming platform.
///
/// The set is closed: every variant has exactly one status provider.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
}

impl Platform {
    /// Human readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::Youtube => "YouTube",
        }
    }

    /// Public page of a channel on this platform.
    pub fn channel_url(&self, username: &str) -> String {
        match self {
            Platform::Twitch => format!("https://twitch.tv/{username}"),
            Platform::Youtube => format!("https://youtube.com/{username}"),
        }
    }

    /// Resolve a channel page URL into its platform and username.
    pub fn parse_channel_url(url: &str) -> Result<ChannelRef, ProviderError> {
        let url = url.trim();
        if let Some(caps) = TWITCH_URL_REGEX.captures(url) {
            return Ok(ChannelRef {
                platform: Platform::Twitch,
                username: caps[1].to_string(),
            });
        }
        if let Some(caps) = YOUTUBE_URL_REGEX.captures(url) {
            return Ok(ChannelRef {
                platform: Platform::Youtube,
                username: caps[1].to_string(),
            });
        }
        Err(ProviderError::InvalidUrl(url.to_string()))
    }
}

/// A `(platform, username)` pair identifying one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub platform: Platform,
    pub username: String,
}
