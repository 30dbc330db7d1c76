//! Logging API routes.
//!
//! Provides endpoints to view and change the log filter at runtime.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::server::AppState;
use crate::logging::{LoggingConfig, available_modules};

/// Request to update the log filter.
#[derive(Debug, Deserialize)]
pub struct UpdateLogFilterRequest {
    pub filter: String,
}

/// Response for logging configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfigResponse {
    pub filter: String,
    pub available_modules: Vec<ModuleInfo>,
}

/// Information about an available logging module.
#[derive(Debug, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
}

/// Create the logging router.
pub fn router() -> Router<AppState> {
    Router::new().route("/filter", get(get_logging_config).put(update_logging_config))
}

fn logging_config(state: &AppState) -> ApiResult<&LoggingConfig> {
    state
        .logging_config
        .as_deref()
        .ok_or_else(|| ApiError::internal("Logging configuration not available"))
}

fn response(filter: String) -> LoggingConfigResponse {
    let modules = available_modules()
        .into_iter()
        .map(|(name, desc)| ModuleInfo {
            name: name.to_string(),
            description: desc.to_string(),
        })
        .collect();

    LoggingConfigResponse {
        filter,
        available_modules: modules,
    }
}

async fn get_logging_config(State(state): State<AppState>) -> ApiResult<Json<LoggingConfigResponse>> {
    let filter = logging_config(&state)?.get_filter();
    Ok(Json(response(filter)))
}

/// Replace the active filter. Invalid directives are rejected with 422.
async fn update_logging_config(
    State(state): State<AppState>,
    Json(request): Json<UpdateLogFilterRequest>,
) -> ApiResult<Json<LoggingConfigResponse>> {
    let config = logging_config(&state)?;
    config.set_filter(&request.filter)?;
    Ok(Json(response(config.get_filter())))
}
