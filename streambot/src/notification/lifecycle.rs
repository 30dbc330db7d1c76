//! Notification lifecycle: publish on live, delete on offline.
//!
//! Callers must hold the channel's lock (see `monitor::ChannelLocks`) so a
//! publish and a teardown for the same channel never interleave.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::message::OutgoingMessage;
use super::sink::{DeleteOutcome, NotificationSink};
use crate::activity::ActivityLog;
use crate::database::repositories::NotificationLedger;
use crate::domain::{BotConfiguration, Channel, NotificationRecord};
use crate::{Error, Result};

/// Outcome of deleting a channel's outstanding notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    pub deleted: usize,
    /// Messages the destination no longer knew about.
    pub already_gone: usize,
    /// Messages whose ledger entries were kept for a later attempt.
    pub failed: usize,
    #[serde(skip)]
    pub errors: Vec<String>,
}

impl TeardownReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    pub fn removed(&self) -> usize {
        self.deleted + self.already_gone
    }

    fn record_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }
}

pub struct NotificationLifecycle {
    sink: Arc<dyn NotificationSink>,
    ledger: Arc<dyn NotificationLedger>,
    activity: Arc<ActivityLog>,
    timeout: Duration,
}

impl NotificationLifecycle {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        ledger: Arc<dyn NotificationLedger>,
        activity: Arc<ActivityLog>,
        timeout: Duration,
    ) -> Self {
        Self {
            sink,
            ledger,
            activity,
            timeout,
        }
    }

    /// Publish the live announcement for `channel` and record it.
    ///
    /// Fails with `NotificationFailed` when the sink rejects the message or
    /// times out; no ledger entry is written in that case.
    pub async fn create_for(
        &self,
        channel: &Channel,
        config: &BotConfiguration,
    ) -> Result<NotificationRecord> {
        let destination = config
            .discord_channel_id
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| Error::config("Discord channel not configured"))?;

        let message = OutgoingMessage::live_announcement(channel, &config.default_message);
        let failed = |reason: String| Error::NotificationFailed {
            channel: channel.display_name.clone(),
            reason,
        };

        let message_id = match tokio::time::timeout(
            self.timeout,
            self.sink.publish(destination, &message),
        )
        .await
        {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => return Err(failed(e.to_string())),
            Err(_) => {
                return Err(failed(
                    Error::timeout("publish", self.timeout).to_string(),
                ));
            }
        };

        let record = NotificationRecord::new(&channel.id, destination, message_id);
        if let Err(e) = self.ledger.insert(&record).await {
            // An unrecorded message could never be torn down, so take it back.
            warn!(channel_id = %channel.id, error = %e, "Failed to record notification, retracting it");
            if let Err(delete_err) = self.delete_one(&record).await {
                warn!(channel_id = %channel.id, error = %delete_err, "Failed to retract unrecorded notification");
            }
            return Err(e);
        }

        self.activity
            .success(
                format!("Notification sent for {} going live", channel.display_name),
                Some(format!("Platform: {}", channel.platform)),
            )
            .await;

        Ok(record)
    }

    /// Delete every outstanding notification of `channel`.
    ///
    /// Each message is attempted independently. Entries are removed from the
    /// ledger when the delete succeeds or the message is already gone.
    pub async fn teardown_for(&self, channel: &Channel) -> Result<TeardownReport> {
        let records = self.ledger.list_for(&channel.id).await?;
        let mut report = TeardownReport::default();

        for record in records {
            let outcome = match self.delete_one(&record).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        channel_id = %channel.id,
                        message_id = %record.message_id,
                        error = %e,
                        "Failed to delete notification"
                    );
                    report.record_failure(e.to_string());
                    continue;
                }
            };

            if let Err(e) = self.ledger.remove_by_id(&record.id).await {
                report.record_failure(e.to_string());
                continue;
            }

            match outcome {
                DeleteOutcome::Deleted => report.deleted += 1,
                DeleteOutcome::NotFound => report.already_gone += 1,
            }
        }

        debug!(
            channel_id = %channel.id,
            deleted = report.deleted,
            already_gone = report.already_gone,
            failed = report.failed,
            "Notification teardown finished"
        );
        Ok(report)
    }

    /// Whether `channel` has notifications left in the ledger.
    pub async fn has_outstanding(&self, channel: &Channel) -> Result<bool> {
        Ok(!self.ledger.list_for(&channel.id).await?.is_empty())
    }

    async fn delete_one(&self, record: &NotificationRecord) -> Result<DeleteOutcome> {
        tokio::time::timeout(
            self.timeout,
            self.sink.delete(&record.destination_id, &record.message_id),
        )
        .await
        .map_err(|_| Error::timeout("delete", self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = TeardownReport {
            deleted: 2,
            already_gone: 1,
            ..Default::default()
        };
        assert!(report.is_complete());
        assert_eq!(report.removed(), 3);

        report.record_failure("boom".into());
        assert!(!report.is_complete());
        assert_eq!(report.errors, vec!["boom".to_string()]);
    }
}
