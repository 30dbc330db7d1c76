//! Service container for dependency injection.
//!
//! The ServiceContainer holds references to all application services
//! and manages their lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use platforms_status::create_client_builder;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activity::ActivityLog;
use crate::config::{AppConfig, ConfigService, ConfigUpdateEvent};
use crate::database::repositories::{
    ChannelRepository, NotificationLedger, SqlxActivityRepository, SqlxChannelRepository,
    SqlxConfigRepository, SqlxNotificationLedger,
};
use crate::domain::{BotConfiguration, ConfigurationUpdate};
use crate::monitor::{ChannelLocks, EngineSettings, ReconciliationEngine, Scheduler, StatusSources};
use crate::notification::{DiscordSink, NotificationLifecycle, NotificationSink};
use crate::services::ChannelService;
use crate::{Error, Result};

/// Activity events scanned when counting sent notifications.
pub const STATS_WINDOW: u32 = 100;

/// Default shutdown timeout.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStats {
    pub total_streamers: usize,
    pub live_streamers: usize,
    /// Notifications sent among the last [`STATS_WINDOW`] activity events.
    pub notifications_sent: usize,
    pub outstanding_notifications: usize,
    pub monitoring_active: bool,
    pub check_interval_secs: u64,
    pub bot_connected: bool,
    pub bot_user: Option<String>,
    pub uptime_secs: u64,
}

/// Service container holding all application services.
pub struct ServiceContainer {
    /// Database connection pool.
    pub pool: SqlitePool,
    /// Bot configuration service.
    pub config_service: Arc<ConfigService>,
    /// Activity log.
    pub activity: Arc<ActivityLog>,
    /// Channel registration and removal.
    pub channels: Arc<ChannelService>,
    /// Reconciliation engine.
    pub engine: Arc<ReconciliationEngine>,
    /// Monitoring timer.
    pub scheduler: Arc<Scheduler>,
    /// Discord bot connection state.
    pub discord: Arc<DiscordSink>,
    channel_repo: Arc<dyn ChannelRepository>,
    ledger: Arc<dyn NotificationLedger>,
    started_at: Instant,
    /// Cancellation token for graceful shutdown.
    cancellation_token: CancellationToken,
}

impl ServiceContainer {
    /// Create a container talking to the real platform and Discord APIs.
    pub async fn new(pool: SqlitePool, settings: AppConfig) -> Result<Self> {
        let client = create_client_builder(Some(settings.request_timeout))
            .build()
            .map_err(|e| Error::Other(format!("Failed to build HTTP client: {e}")))?;

        let sources = StatusSources::with_defaults(client.clone());
        let discord = Arc::new(DiscordSink::new(client));
        Self::with_components(pool, settings, sources, discord.clone(), discord).await
    }

    /// Create a container with explicit status sources and notification sink.
    ///
    /// `discord` still tracks the bot token and connection state; `sink` is
    /// what notifications are actually published through.
    pub async fn with_components(
        pool: SqlitePool,
        settings: AppConfig,
        sources: StatusSources,
        sink: Arc<dyn NotificationSink>,
        discord: Arc<DiscordSink>,
    ) -> Result<Self> {
        info!("Initializing service container");

        // Create repositories
        let channel_repo: Arc<dyn ChannelRepository> =
            Arc::new(SqlxChannelRepository::new(pool.clone()));
        let ledger: Arc<dyn NotificationLedger> =
            Arc::new(SqlxNotificationLedger::new(pool.clone()));
        let activity = Arc::new(ActivityLog::new(Arc::new(SqlxActivityRepository::new(
            pool.clone(),
        ))));
        let config_service = Arc::new(
            ConfigService::load(Arc::new(SqlxConfigRepository::new(pool.clone()))).await?,
        );

        let locks = Arc::new(ChannelLocks::new());
        let missing = sources.missing_platforms();
        if !missing.is_empty() {
            warn!(?missing, "No status provider registered for some platforms");
        }
        let sources = Arc::new(sources);

        let lifecycle = Arc::new(NotificationLifecycle::new(
            sink,
            ledger.clone(),
            activity.clone(),
            settings.request_timeout,
        ));

        let engine = Arc::new(ReconciliationEngine::new(
            channel_repo.clone(),
            sources,
            lifecycle.clone(),
            activity.clone(),
            config_service.clone(),
            locks.clone(),
            EngineSettings::from(settings),
        ));
        let scheduler = Arc::new(Scheduler::new(engine.clone(), activity.clone()));

        let channels = Arc::new(ChannelService::new(
            channel_repo.clone(),
            ledger.clone(),
            lifecycle,
            activity.clone(),
            config_service.clone(),
            locks,
        ));

        info!("Service container initialized");

        Ok(Self {
            pool,
            config_service,
            activity,
            channels,
            engine,
            scheduler,
            discord,
            channel_repo,
            ledger,
            started_at: Instant::now(),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Initialize all services.
    ///
    /// Subscribes to configuration changes and starts the bot when a token
    /// is already stored. A failed auto-start leaves the bot stopped.
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing services");

        let config = self.config_service.get();
        self.discord.set_token(config.discord_bot_token.clone());
        self.setup_config_event_subscriptions();

        if config.has_discord_token() {
            if let Err(e) = self.start_bot().await {
                warn!(error = %e, "Automatic bot start failed");
            }
        } else {
            info!("No Discord token configured, bot stays stopped");
        }

        info!("All services initialized");
        Ok(())
    }

    /// Set up config event subscriptions.
    fn setup_config_event_subscriptions(&self) {
        let mut receiver = self.config_service.subscribe();
        let cancellation_token = self.cancellation_token.clone();
        let scheduler = self.scheduler.clone();
        let discord = self.discord.clone();
        let config_service = self.config_service.clone();
        let activity = self.activity.clone();

        tokio::spawn(async move {
            use tokio::sync::broadcast::error::RecvError;

            loop {
                tokio::select! {
                    _ = cancellation_token.cancelled() => {
                        debug!("Config event handler shutting down");
                        break;
                    }
                    result = receiver.recv() => {
                        match result {
                            Ok(ConfigUpdateEvent::IntervalChanged { from, to }) => {
                                debug!(from, to, "Received interval change");
                                scheduler.update_interval(to).await;
                            }
                            Ok(ConfigUpdateEvent::DiscordUpdated { token_changed }) => {
                                if !token_changed {
                                    continue;
                                }
                                let config = config_service.get();
                                discord.set_token(config.discord_bot_token.clone());
                                if scheduler.is_running() && discord.has_token() {
                                    connect_discord(&discord, &activity).await.ok();
                                }
                            }
                            Ok(event) => {
                                debug!("Received config update event: {}", event.description());
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                warn!(skipped, "Config event handler lagged behind");
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }
        });
    }

    /// Connect the Discord bot and start monitoring.
    pub async fn start_bot(&self) -> Result<()> {
        let config = self.config_service.get();
        if !config.has_discord_token() {
            return Err(Error::config("Discord bot token is required"));
        }

        self.discord.set_token(config.discord_bot_token.clone());
        connect_discord(&self.discord, &self.activity).await?;
        self.scheduler.start(config.check_interval()).await;
        Ok(())
    }

    /// Stop monitoring and disconnect the bot. Returns `false` if monitoring
    /// was not running.
    pub async fn stop_bot(&self) -> bool {
        let was_running = self.scheduler.stop().await;
        self.discord.disconnect();
        was_running
    }

    /// Apply a partial configuration update.
    ///
    /// Dependent services react through the config event subscription.
    pub async fn update_configuration(
        &self,
        update: ConfigurationUpdate,
    ) -> Result<BotConfiguration> {
        let (config, events) = self.config_service.update(update).await?;
        if !events.is_empty() {
            let details = events
                .iter()
                .map(ConfigUpdateEvent::description)
                .collect::<Vec<_>>()
                .join("; ");
            self.activity
                .info("Configuration updated", Some(details))
                .await;
        }
        Ok(config)
    }

    pub async fn stats(&self) -> Result<BotStats> {
        let channels = self.channel_repo.list().await?;
        let outstanding = self.ledger.list_all().await?.len();
        let notifications_sent = self
            .activity
            .recent(STATS_WINDOW)
            .await?
            .iter()
            .filter(|e| e.message.starts_with("Notification sent"))
            .count();

        Ok(BotStats {
            total_streamers: channels.len(),
            live_streamers: channels.iter().filter(|c| c.is_live).count(),
            notifications_sent,
            outstanding_notifications: outstanding,
            monitoring_active: self.scheduler.is_running(),
            check_interval_secs: self
                .scheduler
                .interval_secs()
                .unwrap_or_else(|| self.config_service.get().check_interval()),
            bot_connected: self.discord.is_connected(),
            bot_user: self.discord.bot_user().map(|u| u.tag()),
            uptime_secs: self.started_at.elapsed().as_secs(),
        })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Gracefully shutdown all services.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Gracefully shutdown all services, waiting at most `timeout` for an
    /// in-flight cycle to finish.
    pub async fn shutdown_with_timeout(&self, timeout: Duration) -> Result<()> {
        info!("Shutting down services");

        self.cancellation_token.cancel();

        if tokio::time::timeout(timeout, self.stop_bot()).await.is_err() {
            warn!(
                "Monitoring did not stop within {:?}, continuing shutdown",
                timeout
            );
        }

        self.pool.close().await;
        info!("Services shut down");
        Ok(())
    }
}

/// Verify the bot token and record the outcome in the activity log.
async fn connect_discord(discord: &DiscordSink, activity: &ActivityLog) -> Result<()> {
    match discord.verify().await {
        Ok(user) => {
            activity
                .success(
                    "Discord bot connected successfully",
                    Some(format!("Logged in as {}", user.tag())),
                )
                .await;
            Ok(())
        }
        Err(e) => {
            activity
                .error("Failed to connect Discord bot", Some(e.to_string()))
                .await;
            Err(e)
        }
    }
}
