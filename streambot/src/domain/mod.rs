//! Domain layer: channels, notifications, activity events and bot settings.

pub mod activity;
pub mod channel;
pub mod config;
pub mod notification;

pub use activity::{ActivityEvent, ActivityKind};
pub use channel::{Channel, NewChannel, StatusUpdate};
pub use config::{BotConfiguration, ConfigurationUpdate};
pub use notification::NotificationRecord;
