//! Dashboard statistics.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::error::ApiResult;
use crate::api::server::AppState;
use crate::services::BotStats;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_stats))
}

async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<BotStats>> {
    Ok(Json(state.services.stats().await?))
}
