//! Bot configuration routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::api::error::ApiResult;
use crate::api::models::{ConfigurationResponse, UpdateConfigurationRequest};
use crate::api::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_configuration).post(update_configuration))
}

/// Current configuration with secrets masked.
async fn get_configuration(State(state): State<AppState>) -> Json<ConfigurationResponse> {
    Json(ConfigurationResponse::from(&state.services.config_service.get()))
}

/// Partial update. Masked secrets sent back unchanged are ignored.
async fn update_configuration(
    State(state): State<AppState>,
    Json(request): Json<UpdateConfigurationRequest>,
) -> ApiResult<Json<ConfigurationResponse>> {
    let config = state
        .services
        .update_configuration(request.into())
        .await?;
    Ok(Json(ConfigurationResponse::from(&config)))
}
