//! Notification sink seam.

use async_trait::async_trait;

use super::message::OutgoingMessage;
use crate::Result;

/// Result of a delete request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The destination no longer knows the message.
    NotFound,
}

/// A chat destination that can publish and delete messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish `message` to `destination`, returning the message id.
    async fn publish(&self, destination: &str, message: &OutgoingMessage) -> Result<String>;

    async fn delete(&self, destination: &str, message_id: &str) -> Result<DeleteOutcome>;
}
