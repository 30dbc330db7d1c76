//! Integration tests for the HTTP control API.

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use common::Harness;
use serde_json::{Value, json};
use streambot::api::{ApiServer, ApiServerConfig, AppState};
use tower::ServiceExt;

fn router(h: &Harness) -> Router {
    let state = AppState::new(h.services.clone());
    ApiServer::with_state(ApiServerConfig::default(), state).build_router()
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new().await;
    let (status, body) = send(&router(&h), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_streamer_crud() {
    let h = Harness::new().await;
    let app = router(&h);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/streamers",
        Some(json!({ "platform": "twitch", "username": "alice", "displayName": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["platform"], "twitch");
    assert_eq!(created["displayName"], "Alice");
    assert_eq!(created["isLive"], false);
    assert_eq!(created["url"], "https://twitch.tv/alice");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/streamers",
        Some(json!({ "platform": "twitch", "username": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/streamers",
        Some(json!({ "platform": "twitch", "username": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, list) = send(&app, Method::GET, "/api/streamers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let id = created["id"].as_str().unwrap();
    let (status, removed) = send(&app, Method::DELETE, &format!("/api/streamers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["success"], true);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/streamers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_configuration_is_masked() {
    let h = Harness::new().await;
    let app = router(&h);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/configuration",
        Some(json!({ "discordBotToken": "secret-token", "checkInterval": 90 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["discordBotToken"], "***");
    assert_eq!(body["checkInterval"], 90);

    // Sending the mask back keeps the stored token.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/configuration",
        Some(json!({ "discordBotToken": "***" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        h.services.config_service.get().discord_bot_token.as_deref(),
        Some("secret-token")
    );

    let (_, body) = send(&app, Method::GET, "/api/configuration", None).await;
    assert_eq!(body["discordBotToken"], "***");
    assert_eq!(body["discordChannelId"], common::DESTINATION);
}

#[tokio::test]
async fn test_bot_start_without_token() {
    let h = Harness::new().await;
    let (status, body) = send(&router(&h), Method::POST, "/api/bot/start", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("token"));
}

#[tokio::test]
async fn test_logs_and_refresh() {
    let h = Harness::new().await;
    let app = router(&h);
    h.register(platforms_status::Platform::Twitch, "alice").await;
    h.twitch.set_live("alice", "Live", 5);

    let (status, report) = send(&app, Method::POST, "/api/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["wentLive"], 1);

    let (status, messages) = send(&app, Method::GET, "/api/discord-messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 1);

    let (status, logs) = send(&app, Method::GET, "/api/logs?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["type"], "success");
    assert_eq!(logs[0]["message"], "Notification sent for Alice going live");

    let (status, cleared) = send(&app, Method::DELETE, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["success"], true);
    let (_, logs) = send(&app, Method::GET, "/api/logs", None).await;
    assert!(logs.as_array().unwrap().is_empty());

    let (status, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["liveStreamers"], 1);
}

#[tokio::test]
async fn test_test_notification_route() {
    let h = Harness::new().await;
    let app = router(&h);
    let alice = h.register(platforms_status::Platform::Twitch, "alice").await;

    let (status, record) = send(
        &app,
        Method::POST,
        "/api/test-notification",
        Some(json!({ "streamerId": alice.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["streamerId"], alice.id.as_str());
    assert_eq!(h.sink.published().len(), 1);

    h.sink.set_fail_publish(true);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/test-notification",
        Some(json!({ "streamerId": alice.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_logging_filter_unavailable_without_config() {
    let h = Harness::new().await;
    let (status, _) = send(&router(&h), Method::GET, "/api/logging/filter", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
