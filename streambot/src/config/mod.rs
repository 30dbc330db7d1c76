//! Configuration.
//!
//! Process settings come from the environment ([`AppConfig`]); the bot's
//! runtime settings live in the database behind [`ConfigService`], which
//! caches them and broadcasts a [`ConfigUpdateEvent`] for every change.

pub mod app;
pub mod events;
pub mod service;

pub use app::AppConfig;
pub use events::{ConfigEventBroadcaster, ConfigUpdateEvent};
pub use service::ConfigService;
