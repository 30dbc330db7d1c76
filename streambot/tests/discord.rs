//! Discord REST behaviour against a mock server.

use std::time::{Duration, Instant};

use platforms_status::{Platform, default_client};
use serde_json::json;
use streambot::Error;
use streambot::domain::config::DEFAULT_MESSAGE;
use streambot::domain::{Channel, NewChannel};
use streambot::notification::{DeleteOutcome, DiscordSink, NotificationSink, OutgoingMessage};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DESTINATION: &str = "900000000000000001";

fn sink(server: &MockServer) -> DiscordSink {
    let sink = DiscordSink::with_api_base(default_client(), server.uri());
    sink.set_token(Some("bot-token".into()));
    sink
}

fn message() -> OutgoingMessage {
    let channel = Channel::new(NewChannel {
        platform: Platform::Twitch,
        username: "alice".into(),
        display_name: "Alice".into(),
        custom_message: None,
    });
    OutgoingMessage::live_announcement(&channel, DEFAULT_MESSAGE)
}

fn rate_limited(retry_after: &str) -> ResponseTemplate {
    ResponseTemplate::new(429)
        .insert_header("Retry-After", retry_after)
        .set_body_json(json!({ "message": "You are being rate limited.", "retry_after": 0.05 }))
}

#[tokio::test]
async fn test_publish_returns_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/channels/{DESTINATION}/messages")))
        .and(header("Authorization", "Bot bot-token"))
        .and(body_partial_json(json!({ "content": "🔴 Alice is now live! 🔴" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1234" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = sink(&server).publish(DESTINATION, &message()).await.unwrap();
    assert_eq!(id, "1234");
}

#[tokio::test]
async fn test_publish_waits_out_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/channels/{DESTINATION}/messages")))
        .respond_with(rate_limited("0.2"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/channels/{DESTINATION}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1235" })))
        .mount(&server)
        .await;

    let started = Instant::now();
    let id = sink(&server).publish(DESTINATION, &message()).await.unwrap();
    assert_eq!(id, "1235");
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/channels/{DESTINATION}/messages")))
        .respond_with(rate_limited("0.01"))
        .expect(3)
        .mount(&server)
        .await;

    let err = sink(&server)
        .publish(DESTINATION, &message())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Notification(_)));
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn test_publish_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Missing Access", "code": 50001 })),
        )
        .mount(&server)
        .await;

    let err = sink(&server)
        .publish(DESTINATION, &message())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_delete_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/channels/{DESTINATION}/messages/1")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/channels/{DESTINATION}/messages/2")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Unknown Message", "code": 10008 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/channels/{DESTINATION}/messages/3")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = sink(&server);
    assert_eq!(sink.delete(DESTINATION, "1").await.unwrap(), DeleteOutcome::Deleted);
    assert_eq!(sink.delete(DESTINATION, "2").await.unwrap(), DeleteOutcome::NotFound);
    assert!(sink.delete(DESTINATION, "3").await.is_err());
}

#[tokio::test]
async fn test_verify_tracks_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("Authorization", "Bot bot-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "username": "streambot",
            "discriminator": "0"
        })))
        .mount(&server)
        .await;

    let sink = sink(&server);
    assert!(!sink.is_connected());
    let user = sink.verify().await.unwrap();
    assert_eq!(user.tag(), "streambot");
    assert!(sink.is_connected());
    assert_eq!(sink.bot_user().map(|u| u.id), Some("42".to_string()));

    // A new token needs verifying again.
    assert!(sink.set_token(Some("other-token".into())));
    assert!(!sink.is_connected());
    assert!(sink.verify().await.is_err());
    assert!(!sink.is_connected());
}

#[tokio::test]
async fn test_requests_need_a_token() {
    let server = MockServer::start().await;
    let sink = DiscordSink::with_api_base(default_client(), server.uri());

    let err = sink.publish(DESTINATION, &message()).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
