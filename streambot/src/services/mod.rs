//! Service layer.
//!
//! The container wires repositories, providers, the notification sink and
//! the reconciliation engine together and owns their lifecycle.

pub mod channels;
pub mod container;

pub use channels::ChannelService;
pub use container::{BotStats, ServiceContainer};
