//! API route modules.
//!
//! Organizes routes by resource type.

pub mod bot;
pub mod configuration;
pub mod health;
pub mod logging;
pub mod logs;
pub mod notifications;
pub mod stats;
pub mod streamers;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/stats", stats::router())
        .nest("/api/streamers", streamers::router())
        .nest("/api/configuration", configuration::router())
        .nest("/api/logs", logs::router())
        .nest("/api/bot", bot::router())
        .nest("/api/logging", logging::router())
        .merge(notifications::router())
        .nest("/health", health::router())
        .with_state(state)
}
