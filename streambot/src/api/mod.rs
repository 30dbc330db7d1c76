//! REST API server module.
//!
//! Provides HTTP endpoints for managing monitored channels, the bot
//! configuration, the activity log and the monitoring loop.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};
