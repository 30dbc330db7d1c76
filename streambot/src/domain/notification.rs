//! Outstanding notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message published for a channel that has not been deleted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub channel_id: String,
    /// Destination the message was published to (a Discord text channel id).
    pub destination_id: String,
    /// Opaque identifier returned by the sink.
    pub message_id: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn new(
        channel_id: impl Into<String>,
        destination_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            destination_id: destination_id.into(),
            message_id: message_id.into(),
            created_at: Utc::now(),
        }
    }
}
