//! Bot lifecycle routes.

use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::api::error::ApiResult;
use crate::api::models::BotStatusResponse;
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(bot_status))
        .route("/start", post(start_bot))
        .route("/stop", post(stop_bot))
}

fn status(state: &AppState) -> BotStatusResponse {
    let services = &state.services;
    BotStatusResponse {
        monitoring_active: services.scheduler.is_running(),
        bot_connected: services.discord.is_connected(),
        bot_user: services.discord.bot_user().map(|u| u.tag()),
        check_interval: services.scheduler.interval_secs(),
    }
}

async fn bot_status(State(state): State<AppState>) -> Json<BotStatusResponse> {
    Json(status(&state))
}

/// Verify the Discord token and start monitoring. Responds 400 without a
/// token.
async fn start_bot(State(state): State<AppState>) -> ApiResult<Json<BotStatusResponse>> {
    state.services.start_bot().await?;
    Ok(Json(status(&state)))
}

async fn stop_bot(State(state): State<AppState>) -> Json<BotStatusResponse> {
    state.services.stop_bot().await;
    Json(status(&state))
}
