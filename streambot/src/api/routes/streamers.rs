//! Streamer management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::api::error::ApiResult;
use crate::api::models::{CreateStreamerRequest, RemoveStreamerResponse, StreamerResponse};
use crate::api::server::AppState;

/// Create the streamers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_streamers).post(create_streamer))
        .route("/{id}", get(get_streamer))
        .route("/{id}", delete(delete_streamer))
}

async fn list_streamers(State(state): State<AppState>) -> ApiResult<Json<Vec<StreamerResponse>>> {
    let channels = state.services.channels.list().await?;
    Ok(Json(channels.into_iter().map(StreamerResponse::from).collect()))
}

async fn get_streamer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StreamerResponse>> {
    let channel = state.services.channels.get(&id).await?;
    Ok(Json(channel.into()))
}

/// Register a channel. Responds 409 when it is already monitored.
async fn create_streamer(
    State(state): State<AppState>,
    Json(request): Json<CreateStreamerRequest>,
) -> ApiResult<(StatusCode, Json<StreamerResponse>)> {
    let input = request.into_new_channel()?;
    let channel = state.services.channels.register(input).await?;
    Ok((StatusCode::CREATED, Json(channel.into())))
}

/// Delete the channel's notifications, then the channel.
async fn delete_streamer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RemoveStreamerResponse>> {
    let report = state.services.channels.remove(&id).await?;
    Ok(Json(RemoveStreamerResponse {
        success: true,
        notifications_deleted: report.removed(),
        notifications_failed: report.failed,
    }))
}
