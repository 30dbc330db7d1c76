//! Configuration update events.

use tokio::sync::broadcast;

/// Broadcast when the bot configuration changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdateEvent {
    /// The polling interval changed.
    IntervalChanged { from: u64, to: u64 },
    /// The Discord destination changed; `token_changed` is set when the bot
    /// token itself differs.
    DiscordUpdated { token_changed: bool },
    /// Twitch or YouTube credentials changed.
    CredentialsUpdated,
    /// The default notification message changed.
    MessageUpdated,
}

impl ConfigUpdateEvent {
    /// Get a description of the event for logging.
    pub fn description(&self) -> String {
        match self {
            Self::IntervalChanged { from, to } => {
                format!("Check interval changed from {from}s to {to}s")
            }
            Self::DiscordUpdated { token_changed } => {
                format!("Discord settings updated (token changed: {token_changed})")
            }
            Self::CredentialsUpdated => "Platform credentials updated".to_string(),
            Self::MessageUpdated => "Default message updated".to_string(),
        }
    }
}

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of configuration update events.
#[derive(Clone)]
pub struct ConfigEventBroadcaster {
    sender: broadcast::Sender<ConfigUpdateEvent>,
}

impl ConfigEventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigUpdateEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: ConfigUpdateEvent) -> usize {
        tracing::debug!("Publishing config event: {}", event.description());
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ConfigEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let broadcaster = ConfigEventBroadcaster::new();
        assert_eq!(broadcaster.publish(ConfigUpdateEvent::MessageUpdated), 0);

        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);
        let event = ConfigUpdateEvent::IntervalChanged { from: 60, to: 120 };
        assert_eq!(broadcaster.publish(event.clone()), 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
