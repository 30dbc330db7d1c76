//! Monitored channel entity.

use chrono::{DateTime, Utc};
use platforms_status::{Platform, StreamStatus};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest accepted username or display name.
const MAX_NAME_LEN: usize = 100;

/// Longest accepted custom message template.
const MAX_MESSAGE_LEN: usize = 2000;

/// A monitored `(platform, username)` identity with its last known status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    /// Overrides the configured default message when set.
    pub custom_message: Option<String>,
    pub is_live: bool,
    pub last_live_at: Option<DateTime<Utc>>,
    pub viewer_count: u64,
    pub category: Option<String>,
    pub stream_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    /// Create an offline channel from validated input.
    pub fn new(input: NewChannel) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            platform: input.platform,
            username: input.username,
            display_name: input.display_name,
            custom_message: input.custom_message,
            is_live: false,
            last_live_at: None,
            viewer_count: 0,
            category: None,
            stream_title: None,
            thumbnail_url: None,
            created_at: Utc::now(),
        }
    }

    /// Public page of this channel.
    pub fn url(&self) -> String {
        self.platform.channel_url(&self.username)
    }

    /// Apply a status update in memory.
    pub fn apply(&mut self, update: &StatusUpdate) {
        self.is_live = update.is_live;
        self.viewer_count = update.viewer_count;
        self.category = update.category.clone();
        self.stream_title = update.stream_title.clone();
        self.thumbnail_url = update.thumbnail_url.clone();
        if update.last_live_at.is_some() {
            self.last_live_at = update.last_live_at;
        }
    }
}

/// Input for registering a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChannel {
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    pub custom_message: Option<String>,
}

impl NewChannel {
    /// Trim fields and reject blank or oversized values.
    ///
    /// A blank custom message is treated as absent.
    pub fn validated(self) -> Result<Self> {
        let username = self.username.trim().to_string();
        let display_name = self.display_name.trim().to_string();

        if username.is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        if username.len() > MAX_NAME_LEN {
            return Err(Error::validation(format!(
                "username must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(Error::validation("username must not contain whitespace"));
        }
        if display_name.is_empty() {
            return Err(Error::validation("display name must not be empty"));
        }
        if display_name.len() > MAX_NAME_LEN {
            return Err(Error::validation(format!(
                "display name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let custom_message = self
            .custom_message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if custom_message.as_ref().is_some_and(|m| m.len() > MAX_MESSAGE_LEN) {
            return Err(Error::validation(format!(
                "custom message must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }

        Ok(Self {
            platform: self.platform,
            username,
            display_name,
            custom_message,
        })
    }
}

/// Fresh status fields written by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub is_live: bool,
    pub viewer_count: u64,
    pub category: Option<String>,
    pub stream_title: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Set only on an offline-to-live transition; `None` leaves the stored
    /// value untouched.
    pub last_live_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    /// Build the update for a status read.
    ///
    /// Offline reads clear every descriptive field. The live timestamp is
    /// left alone; see [`StatusUpdate::went_live_at`].
    pub fn from_status(status: &StreamStatus) -> Self {
        if !status.is_live {
            return Self::offline();
        }
        Self {
            is_live: true,
            viewer_count: status.viewer_count.unwrap_or(0),
            category: status.category.clone(),
            stream_title: status.title.clone(),
            thumbnail_url: status.thumbnail_url.clone(),
            last_live_at: None,
        }
    }

    /// Stamp the time the channel went live.
    pub fn went_live_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_live_at = Some(at);
        self
    }

    pub fn offline() -> Self {
        Self {
            is_live: false,
            viewer_count: 0,
            category: None,
            stream_title: None,
            thumbnail_url: None,
            last_live_at: None,
        }
    }
}
