//! Activity log routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::api::error::ApiResult;
use crate::api::models::{ActivityEventResponse, ClearLogsResponse, LogsQuery};
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_logs).delete(clear_logs))
}

/// Most recent events first.
async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<ActivityEventResponse>>> {
    let events = state
        .services
        .activity
        .recent(query.effective_limit())
        .await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

async fn clear_logs(State(state): State<AppState>) -> ApiResult<Json<ClearLogsResponse>> {
    let deleted = state.services.activity.clear().await?;
    Ok(Json(ClearLogsResponse {
        success: true,
        deleted,
    }))
}
