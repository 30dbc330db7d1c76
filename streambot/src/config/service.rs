//! Cached access to the persisted bot configuration.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};
use tracing::info;

use super::events::{ConfigEventBroadcaster, ConfigUpdateEvent};
use crate::Result;
use crate::database::repositories::ConfigRepository;
use crate::domain::{BotConfiguration, ConfigurationUpdate};

/// Configuration service.
///
/// Reads are served from memory. Writes go to the database first, then
/// replace the cached value and publish one event per changed area.
pub struct ConfigService {
    repo: Arc<dyn ConfigRepository>,
    current: RwLock<BotConfiguration>,
    /// Serializes read-modify-write updates.
    write_lock: Mutex<()>,
    broadcaster: ConfigEventBroadcaster,
}

impl ConfigService {
    /// Load the stored configuration, persisting defaults on first run.
    pub async fn load(repo: Arc<dyn ConfigRepository>) -> Result<Self> {
        let current = match repo.load().await? {
            Some(config) => config,
            None => {
                let config = BotConfiguration::default();
                repo.save(&config).await?;
                info!("Initialized default bot configuration");
                config
            }
        };

        Ok(Self {
            repo,
            current: RwLock::new(current),
            write_lock: Mutex::new(()),
            broadcaster: ConfigEventBroadcaster::new(),
        })
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> BotConfiguration {
        self.current.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigUpdateEvent> {
        self.broadcaster.subscribe()
    }

    /// Apply a partial update and return the new configuration together with
    /// the events that were published.
    pub async fn update(
        &self,
        update: ConfigurationUpdate,
    ) -> Result<(BotConfiguration, Vec<ConfigUpdateEvent>)> {
        let _guard = self.write_lock.lock().await;

        let previous = self.get();
        let next = update.apply_to(&previous);
        if next == previous {
            return Ok((next, Vec::new()));
        }

        self.repo.save(&next).await?;
        *self.current.write() = next.clone();

        let events = diff(&previous, &next);
        for event in &events {
            self.broadcaster.publish(event.clone());
        }
        info!(changes = events.len(), "Bot configuration updated");
        Ok((next, events))
    }
}

/// Events describing what changed between two configurations.
pub fn diff(old: &BotConfiguration, new: &BotConfiguration) -> Vec<ConfigUpdateEvent> {
    let mut events = Vec::new();

    if old.check_interval() != new.check_interval() {
        events.push(ConfigUpdateEvent::IntervalChanged {
            from: old.check_interval(),
            to: new.check_interval(),
        });
    }

    let token_changed = old.discord_bot_token != new.discord_bot_token;
    if token_changed
        || old.discord_channel_id != new.discord_channel_id
        || old.discord_server_id != new.discord_server_id
    {
        events.push(ConfigUpdateEvent::DiscordUpdated { token_changed });
    }

    if old.credentials() != new.credentials() {
        events.push(ConfigUpdateEvent::CredentialsUpdated);
    }

    if old.default_message != new.default_message {
        events.push(ConfigUpdateEvent::MessageUpdated);
    }

    events
}
