//! Notification and manual check routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::api::error::ApiResult;
use crate::api::models::{NotificationRecordResponse, TestNotificationRequest};
use crate::api::server::AppState;
use crate::monitor::CycleReport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/test-notification", post(test_notification))
        .route("/api/discord-messages", get(list_messages))
        .route("/api/refresh", post(refresh))
}

/// Publish a notification for a channel regardless of its status.
async fn test_notification(
    State(state): State<AppState>,
    Json(request): Json<TestNotificationRequest>,
) -> ApiResult<(StatusCode, Json<NotificationRecordResponse>)> {
    let record = state
        .services
        .channels
        .send_test_notification(&request.streamer_id)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn list_messages(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NotificationRecordResponse>>> {
    let records = state.services.channels.notifications().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Run a cycle now, waiting for an in-flight one first.
async fn refresh(State(state): State<AppState>) -> ApiResult<Json<CycleReport>> {
    Ok(Json(state.services.scheduler.check_now().await?))
}
