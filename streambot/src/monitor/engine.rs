//! One reconciliation cycle: poll, diff, react.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::locks::ChannelLocks;
use super::sources::StatusSources;
use super::transition::Transition;
use crate::activity::ActivityLog;
use crate::config::{AppConfig, ConfigService};
use crate::database::repositories::ChannelRepository;
use crate::domain::{BotConfiguration, Channel, StatusUpdate};
use crate::notification::{NotificationLifecycle, TeardownReport};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Upper bound for a single status query.
    pub request_timeout: Duration,
    /// Status queries in flight at once.
    pub max_concurrent_queries: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        AppConfig::default().into()
    }
}

impl From<AppConfig> for EngineSettings {
    fn from(config: AppConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            max_concurrent_queries: config.max_concurrent_checks,
        }
    }
}

/// Summary of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub checked: usize,
    pub went_live: usize,
    pub went_offline: usize,
    pub failures: usize,
    pub notifications_published: usize,
    pub notifications_deleted: usize,
    pub duration_ms: u64,
}

impl CycleReport {
    fn record(&mut self, outcome: ChannelOutcome) {
        match outcome {
            ChannelOutcome::Unchanged | ChannelOutcome::Removed => {}
            ChannelOutcome::WentLive { published } => {
                self.went_live += 1;
                if published {
                    self.notifications_published += 1;
                }
            }
            ChannelOutcome::WentOffline { deleted } => {
                self.went_offline += 1;
                self.notifications_deleted += deleted;
            }
            ChannelOutcome::RetriedTeardown { deleted } => {
                self.notifications_deleted += deleted;
            }
            ChannelOutcome::Failed => self.failures += 1,
        }
    }

    /// Whether anything changed on any platform.
    pub fn has_changes(&self) -> bool {
        self.went_live > 0 || self.went_offline > 0
    }
}

/// What happened to a single channel during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelOutcome {
    Unchanged,
    WentLive { published: bool },
    WentOffline { deleted: usize },
    /// Leftover notifications of an offline channel were deleted.
    RetriedTeardown { deleted: usize },
    /// Deleted while its status query was in flight.
    Removed,
    Failed,
}

/// Polls every channel and keeps notifications in step with live status.
///
/// Cycles never overlap: [`run_cycle`](Self::run_cycle) waits for a running
/// cycle, [`try_run_cycle`](Self::try_run_cycle) skips instead.
pub struct ReconciliationEngine {
    channels: Arc<dyn ChannelRepository>,
    sources: Arc<StatusSources>,
    lifecycle: Arc<NotificationLifecycle>,
    activity: Arc<ActivityLog>,
    config: Arc<ConfigService>,
    locks: Arc<ChannelLocks>,
    cycle_guard: Mutex<()>,
    settings: EngineSettings,
}

impl ReconciliationEngine {
    pub fn new(
        channels: Arc<dyn ChannelRepository>,
        sources: Arc<StatusSources>,
        lifecycle: Arc<NotificationLifecycle>,
        activity: Arc<ActivityLog>,
        config: Arc<ConfigService>,
        locks: Arc<ChannelLocks>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            channels,
            sources,
            lifecycle,
            activity,
            config,
            locks,
            cycle_guard: Mutex::new(()),
            settings,
        }
    }

    /// Run a cycle, waiting for one already in progress to finish first.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let _guard = self.cycle_guard.lock().await;
        self.guarded_cycle().await
    }

    /// Run a cycle unless one is already in progress.
    pub async fn try_run_cycle(&self) -> Option<Result<CycleReport>> {
        let _guard = self.cycle_guard.try_lock().ok()?;
        Some(self.guarded_cycle().await)
    }

    pub fn is_cycle_running(&self) -> bool {
        self.cycle_guard.try_lock().is_err()
    }

    async fn guarded_cycle(&self) -> Result<CycleReport> {
        let result = self.cycle().await;
        if let Err(e) = &result {
            self.activity
                .error("Monitoring cycle failed", Some(e.to_string()))
                .await;
        }
        result
    }

    async fn cycle(&self) -> Result<CycleReport> {
        let started = Instant::now();

        // Values captured here hold for the whole cycle.
        let config = self.config.get();
        self.sources.configure(&config.credentials());

        let channels = self.channels.list().await?;
        let mut report = CycleReport {
            checked: channels.len(),
            ..Default::default()
        };

        let config = &config;
        let mut outcomes = stream::iter(channels)
            .map(|channel| async move { self.check_channel(channel, config).await })
            .buffer_unordered(self.settings.max_concurrent_queries.max(1));

        while let Some(outcome) = outcomes.next().await {
            report.record(outcome);
        }

        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if report.has_changes() || report.failures > 0 {
            info!(
                checked = report.checked,
                went_live = report.went_live,
                went_offline = report.went_offline,
                failures = report.failures,
                duration_ms = report.duration_ms,
                "Monitoring cycle finished"
            );
        } else {
            debug!(
                checked = report.checked,
                duration_ms = report.duration_ms,
                "Monitoring cycle finished without changes"
            );
        }
        Ok(report)
    }

    /// Query one channel and reconcile it. Never fails the cycle.
    async fn check_channel(&self, channel: Channel, config: &BotConfiguration) -> ChannelOutcome {
        let query = self.sources.query(channel.platform, &channel.username);
        let status = match tokio::time::timeout(self.settings.request_timeout, query).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                self.report_failure(&channel, e.into()).await;
                return ChannelOutcome::Failed;
            }
            Err(_) => {
                let error = Error::timeout(
                    format!("status query for {}", channel.username),
                    self.settings.request_timeout,
                );
                self.report_failure(&channel, error).await;
                return ChannelOutcome::Failed;
            }
        };

        let update = StatusUpdate::from_status(&status);
        match self.reconcile(&channel.id, update, config).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.report_failure(&channel, e).await;
                ChannelOutcome::Failed
            }
        }
    }

    async fn report_failure(&self, channel: &Channel, error: Error) {
        warn!(channel_id = %channel.id, username = %channel.username, error = %error, "Channel check failed");
        self.activity
            .error(
                format!("Error checking streamer {}", channel.display_name),
                Some(error.to_string()),
            )
            .await;
    }

    /// Apply a fresh status under the channel's lock.
    async fn reconcile(
        &self,
        channel_id: &str,
        update: StatusUpdate,
        config: &BotConfiguration,
    ) -> Result<ChannelOutcome> {
        let guard = self.locks.lock(channel_id).await;

        // The stored row is the source of truth; it may have changed or
        // vanished while the query was in flight.
        let mut channel = match self.channels.get(channel_id).await {
            Ok(channel) => channel,
            Err(Error::NotFound { .. }) => {
                debug!(channel_id, "Channel removed during cycle, skipping");
                drop(guard);
                self.locks.remove(channel_id);
                return Ok(ChannelOutcome::Removed);
            }
            Err(e) => return Err(e),
        };

        let transition = Transition::between(channel.is_live, update.is_live);
        if transition.is_change() {
            info!(channel_id, username = %channel.username, %transition, "Live status changed");
        } else {
            debug!(channel_id, %transition, "Status read");
        }

        match transition {
            Transition::WentLive => {
                let update = update.went_live_at(Utc::now());
                self.channels.update_status(channel_id, &update).await?;
                channel.apply(&update);
                let published = self.publish(&channel, config).await;
                Ok(ChannelOutcome::WentLive { published })
            }
            Transition::WentOffline => {
                // Teardown runs before the live flag is cleared.
                let teardown = self.lifecycle.teardown_for(&channel).await;
                self.channels.update_status(channel_id, &update).await?;
                let deleted = self.report_teardown(&channel, teardown, true).await;
                Ok(ChannelOutcome::WentOffline { deleted })
            }
            Transition::StillLive => {
                // Descriptive fields only; `last_live_at` keeps the transition time.
                self.channels.update_status(channel_id, &update).await?;
                Ok(ChannelOutcome::Unchanged)
            }
            Transition::StillOffline => {
                self.channels.update_status(channel_id, &update).await?;
                self.retry_teardown(&channel).await
            }
        }
    }

    async fn publish(&self, channel: &Channel, config: &BotConfiguration) -> bool {
        match self.lifecycle.create_for(channel, config).await {
            Ok(record) => {
                info!(
                    channel_id = %channel.id,
                    message_id = %record.message_id,
                    "Live notification published"
                );
                true
            }
            Err(e) => {
                warn!(channel_id = %channel.id, error = %e, "Live notification failed");
                self.activity
                    .error(
                        format!("Failed to send notification for {}", channel.display_name),
                        Some(e.to_string()),
                    )
                    .await;
                false
            }
        }
    }

    /// Delete notifications an earlier teardown could not remove.
    async fn retry_teardown(&self, channel: &Channel) -> Result<ChannelOutcome> {
        if !self.lifecycle.has_outstanding(channel).await? {
            return Ok(ChannelOutcome::Unchanged);
        }
        debug!(channel_id = %channel.id, "Retrying teardown of leftover notifications");
        let teardown = self.lifecycle.teardown_for(channel).await;
        let deleted = self.report_teardown(channel, teardown, false).await;
        Ok(ChannelOutcome::RetriedTeardown { deleted })
    }

    /// Record the teardown outcome and return how many entries were removed.
    async fn report_teardown(
        &self,
        channel: &Channel,
        teardown: Result<TeardownReport>,
        went_offline: bool,
    ) -> usize {
        match teardown {
            Ok(report) if report.is_complete() => {
                if went_offline {
                    self.activity
                        .info(
                            format!("{} went offline, notifications deleted", channel.display_name),
                            Some(format!(
                                "Deleted: {}, already gone: {}",
                                report.deleted, report.already_gone
                            )),
                        )
                        .await;
                }
                report.removed()
            }
            Ok(report) => {
                self.activity
                    .warning(
                        format!("Failed to delete notifications for {}", channel.display_name),
                        Some(report.errors.join("; ")),
                    )
                    .await;
                report.removed()
            }
            Err(e) => {
                self.activity
                    .warning(
                        format!("Failed to delete notifications for {}", channel.display_name),
                        Some(e.to_string()),
                    )
                    .await;
                0
            }
        }
    }
}
