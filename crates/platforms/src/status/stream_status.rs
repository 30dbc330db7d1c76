use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live status of a channel as reported by its platform.
///
/// Descriptive fields are only meaningful while `is_live` is true; an offline
/// status carries none of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamStatus {
    pub is_live: bool,
    pub title: Option<String>,
    /// Game or category name.
    pub category: Option<String>,
    pub viewer_count: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl StreamStatus {
    /// An offline status.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Start building a live status.
    pub fn live() -> StreamStatusBuilder {
        StreamStatusBuilder {
            status: StreamStatus {
                is_live: true,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamStatusBuilder {
    status: StreamStatus,
}

impl StreamStatusBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.status.title = Some(title.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.status.category = Some(category.into()).filter(|c: &String| !c.is_empty());
        self
    }

    pub fn viewer_count(mut self, viewers: u64) -> Self {
        self.status.viewer_count = Some(viewers);
        self
    }

    pub fn thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.status.thumbnail_url = Some(url.into()).filter(|u: &String| !u.is_empty());
        self
    }

    pub fn started_at(mut self, started_at: Option<DateTime<Utc>>) -> Self {
        self.status.started_at = started_at;
        self
    }

    pub fn build(self) -> StreamStatus {
        self.status
    }
}
