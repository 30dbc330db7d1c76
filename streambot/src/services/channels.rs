//! Channel registration and removal.

use std::sync::Arc;

use tracing::{info, warn};

use crate::activity::ActivityLog;
use crate::config::ConfigService;
use crate::database::repositories::{ChannelRepository, NotificationLedger};
use crate::domain::{Channel, NewChannel, NotificationRecord};
use crate::monitor::ChannelLocks;
use crate::notification::{NotificationLifecycle, TeardownReport};
use crate::{Error, Result};

/// Control-plane operations on channels.
///
/// Removal and test notifications take the same per-channel lock as the
/// reconciliation engine.
pub struct ChannelService {
    channels: Arc<dyn ChannelRepository>,
    ledger: Arc<dyn NotificationLedger>,
    lifecycle: Arc<NotificationLifecycle>,
    activity: Arc<ActivityLog>,
    config: Arc<ConfigService>,
    locks: Arc<ChannelLocks>,
}

impl ChannelService {
    pub fn new(
        channels: Arc<dyn ChannelRepository>,
        ledger: Arc<dyn NotificationLedger>,
        lifecycle: Arc<NotificationLifecycle>,
        activity: Arc<ActivityLog>,
        config: Arc<ConfigService>,
        locks: Arc<ChannelLocks>,
    ) -> Self {
        Self {
            channels,
            ledger,
            lifecycle,
            activity,
            config,
            locks,
        }
    }

    pub async fn list(&self) -> Result<Vec<Channel>> {
        self.channels.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Channel> {
        self.channels.get(id).await
    }

    /// Register a new channel. Fails with `Conflict` when the platform and
    /// username are already monitored.
    pub async fn register(&self, input: NewChannel) -> Result<Channel> {
        let input = input.validated()?;

        if self
            .channels
            .get_by_identity(input.platform, &input.username)
            .await?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "{} channel '{}' is already registered",
                input.platform.display_name(),
                input.username
            )));
        }

        let channel = Channel::new(input);
        self.channels.create(&channel).await?;

        info!(channel_id = %channel.id, platform = %channel.platform, username = %channel.username, "Channel registered");
        self.activity
            .success(
                format!("Added new streamer: {}", channel.display_name),
                Some(format!(
                    "Platform: {}, username: {}",
                    channel.platform.display_name(),
                    channel.username
                )),
            )
            .await;
        Ok(channel)
    }

    /// Tear down a channel's notifications, then delete it.
    ///
    /// The channel is deleted even if some deletes failed; those messages are
    /// reported in the returned report and a warning event.
    pub async fn remove(&self, id: &str) -> Result<TeardownReport> {
        let guard = self.locks.lock(id).await;
        let channel = self.channels.get(id).await?;

        let report = match self.lifecycle.teardown_for(&channel).await {
            Ok(report) => report,
            Err(e) => {
                warn!(channel_id = %id, error = %e, "Teardown before removal failed");
                TeardownReport {
                    failed: 1,
                    errors: vec![e.to_string()],
                    ..Default::default()
                }
            }
        };
        if !report.is_complete() {
            self.activity
                .warning(
                    format!("Failed to delete notifications for {}", channel.display_name),
                    Some(report.errors.join("; ")),
                )
                .await;
        }

        self.channels.delete(id).await?;
        drop(guard);
        self.locks.remove(id);

        info!(channel_id = %id, "Channel removed");
        self.activity
            .info(format!("Removed streamer: {}", channel.display_name), None)
            .await;
        Ok(report)
    }

    /// Publish a notification for a channel.
    ///
    /// The message is recorded in the ledger like any other, so it is torn
    /// down with the channel's next offline transition or removal. A live
    /// channel that is already announced is rejected with `Conflict`, so a
    /// live session never carries two announcements.
    pub async fn send_test_notification(&self, id: &str) -> Result<NotificationRecord> {
        let _guard = self.locks.lock(id).await;
        let channel = self.channels.get(id).await?;
        if channel.is_live && self.lifecycle.has_outstanding(&channel).await? {
            return Err(Error::conflict(format!(
                "{} is live and already has a notification",
                channel.display_name
            )));
        }
        let config = self.config.get();

        match self.lifecycle.create_for(&channel, &config).await {
            Ok(record) => Ok(record),
            Err(e) => {
                self.activity
                    .error(
                        format!("Failed to send test notification for {}", channel.display_name),
                        Some(e.to_string()),
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Every outstanding notification, newest first.
    pub async fn notifications(&self) -> Result<Vec<NotificationRecord>> {
        self.ledger.list_all().await
    }
}
