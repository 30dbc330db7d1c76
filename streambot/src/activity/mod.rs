//! Activity log: persisted, broadcast and mirrored into `tracing`.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::Result;
use crate::database::repositories::ActivityRepository;
use crate::domain::{ActivityEvent, ActivityKind};

/// Number of events kept; older ones are evicted first.
pub const DEFAULT_RETENTION: u32 = 500;

const BROADCAST_CAPACITY: usize = 256;

/// Append-only audit trail of what the bot did.
///
/// Appending never fails the caller: a storage error is logged and the event
/// still reaches `tracing` and live subscribers.
pub struct ActivityLog {
    repo: Arc<dyn ActivityRepository>,
    retention: u32,
    sender: broadcast::Sender<ActivityEvent>,
}

impl ActivityLog {
    pub fn new(repo: Arc<dyn ActivityRepository>) -> Self {
        Self::with_retention(repo, DEFAULT_RETENTION)
    }

    pub fn with_retention(repo: Arc<dyn ActivityRepository>, retention: u32) -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            repo,
            retention: retention.max(1),
            sender,
        }
    }

    pub async fn append(
        &self,
        kind: ActivityKind,
        message: impl Into<String>,
        details: Option<String>,
    ) -> ActivityEvent {
        let event = ActivityEvent::new(kind, message, details);
        mirror_to_tracing(&event);

        if let Err(e) = self.repo.insert(&event).await {
            warn!(error = %e, "Failed to persist activity event");
        } else {
            match self.repo.trim(self.retention).await {
                Ok(0) => {}
                Ok(evicted) => tracing::debug!(evicted, "Trimmed activity log"),
                Err(e) => warn!(error = %e, "Failed to trim activity log"),
            }
        }

        let _ = self.sender.send(event.clone());
        event
    }

    pub async fn success(&self, message: impl Into<String>, details: Option<String>) {
        self.append(ActivityKind::Success, message, details).await;
    }

    pub async fn info(&self, message: impl Into<String>, details: Option<String>) {
        self.append(ActivityKind::Info, message, details).await;
    }

    pub async fn warning(&self, message: impl Into<String>, details: Option<String>) {
        self.append(ActivityKind::Warning, message, details).await;
    }

    pub async fn error(&self, message: impl Into<String>, details: Option<String>) {
        self.append(ActivityKind::Error, message, details).await;
    }

    /// Newest events first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<ActivityEvent>> {
        self.repo.list_recent(limit).await
    }

    pub async fn clear(&self) -> Result<u64> {
        let removed = self.repo.clear().await?;
        info!(removed, "Activity log cleared");
        Ok(removed)
    }

    /// Receive events as they are appended.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }
}

fn mirror_to_tracing(event: &ActivityEvent) {
    let details = event.details.as_deref().unwrap_or("");
    match event.kind {
        ActivityKind::Error => error!(target: "streambot::activity", details, "{}", event.message),
        ActivityKind::Warning => warn!(target: "streambot::activity", details, "{}", event.message),
        ActivityKind::Success | ActivityKind::Info => {
            info!(target: "streambot::activity", kind = %event.kind, details, "{}", event.message)
        }
    }
}
