//! HTTP-level tests for the platform providers against a mock server.

use platforms_status::{
    ProviderCredentials, ProviderError, StatusProvider, TwitchProvider, YoutubeProvider,
    default_client,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod twitch {
    use super::*;

    fn provider(server: &MockServer) -> TwitchProvider {
        let provider = TwitchProvider::with_endpoints(
            default_client(),
            format!("{}/helix", server.uri()),
            format!("{}/oauth2/token", server.uri()),
        );
        provider.configure(&ProviderCredentials {
            twitch_client_id: Some("client-id".into()),
            twitch_client_secret: Some("client-secret".into()),
            ..Default::default()
        });
        provider
    }

    fn token_response(token: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": 3600,
            "token_type": "bearer"
        }))
    }

    fn live_stream() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "user_login": "alice",
                "game_name": "Chess",
                "title": "Ranked",
                "viewer_count": 120,
                "started_at": "2024-05-01T18:00:00Z",
                "thumbnail_url": "https://cdn/live_user_alice-{width}x{height}.jpg"
            }],
            "pagination": {}
        }))
    }

    #[tokio::test]
    async fn test_live_stream_with_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", "client-id"))
            .respond_with(token_response("token-1"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/streams"))
            .and(query_param("user_login", "alice"))
            .and(header("Client-ID", "client-id"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(live_stream())
            .expect(2)
            .mount(&server)
            .await;

        let provider = provider(&server);
        let status = provider.query("alice").await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.title.as_deref(), Some("Ranked"));
        assert_eq!(status.category.as_deref(), Some("Chess"));
        assert_eq!(status.viewer_count, Some(120));
        assert_eq!(
            status.thumbnail_url.as_deref(),
            Some("https://cdn/live_user_alice-320x180.jpg")
        );

        // The token is reused for the second query.
        provider.query("alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_when_no_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(token_response("token-1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/streams"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": [], "pagination": {} })),
            )
            .mount(&server)
            .await;

        let status = provider(&server).query("bob").await.unwrap();
        assert!(!status.is_live);
        assert_eq!(status.title, None);
    }

    #[tokio::test]
    async fn test_rejected_token_is_refreshed_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(token_response("token-1"))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/streams"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid OAuth token" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/streams"))
            .respond_with(live_stream())
            .mount(&server)
            .await;

        let status = provider(&server).query("alice").await.unwrap();
        assert!(status.is_live);
    }

    #[tokio::test]
    async fn test_failed_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid client secret"))
            .mount(&server)
            .await;

        let err = provider(&server).query("alice").await.unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
        assert!(err.to_string().contains("invalid client secret"));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(token_response("token-1"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/helix/streams"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "busy" })))
            .mount(&server)
            .await;

        let err = provider(&server).query("alice").await.unwrap_err();
        match &err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_transient());
    }
}

mod youtube {
    use super::*;

    fn provider(server: &MockServer) -> YoutubeProvider {
        let provider = YoutubeProvider::with_base_url(default_client(), server.uri());
        provider.configure(&ProviderCredentials {
            youtube_api_key: Some("api-key".into()),
            ..Default::default()
        });
        provider
    }

    fn items(items: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
    }

    async fn mount_channel_by_id(server: &MockServer, channel_id: &str, expected: u64) {
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("forUsername", channel_id))
            .respond_with(items(json!([])))
            .expect(expected)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("id", channel_id))
            .respond_with(items(json!([{ "id": channel_id }])))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_legacy_username_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("forUsername", "somechannel"))
            .and(query_param("key", "api-key"))
            .respond_with(items(json!([{ "id": "UC123" }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UC123"))
            .and(query_param("eventType", "live"))
            .respond_with(items(json!([])))
            .mount(&server)
            .await;

        let status = provider(&server).query("somechannel").await.unwrap();
        assert!(!status.is_live);
    }

    #[tokio::test]
    async fn test_falls_back_to_channel_id_and_caches_it() {
        let server = MockServer::start().await;
        mount_channel_by_id(&server, "UCxyz", 1).await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UCxyz"))
            .respond_with(items(json!([{ "id": { "kind": "youtube#video", "videoId": "vid1" } }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "vid1"))
            .respond_with(items(json!([{
                "snippet": {
                    "title": "Live coding",
                    "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/vid1/mqdefault_live.jpg" } }
                },
                "liveStreamingDetails": { "concurrentViewers": "1534" }
            }])))
            .mount(&server)
            .await;

        let provider = provider(&server);
        let status = provider.query("UCxyz").await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.title.as_deref(), Some("Live coding"));
        assert_eq!(status.viewer_count, Some(1534));
        assert_eq!(
            status.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/vid1/mqdefault_live.jpg")
        );

        // Resolution is cached, the channel lookups are not repeated.
        provider.query("UCxyz").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_video_details_mean_offline() {
        let server = MockServer::start().await;
        mount_channel_by_id(&server, "UCxyz", 1).await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(items(json!([{ "id": { "videoId": "vid1" } }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(items(json!([])))
            .mount(&server)
            .await;

        let status = provider(&server).query("UCxyz").await.unwrap();
        assert!(!status.is_live);
    }

    #[tokio::test]
    async fn test_unknown_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(items(json!([])))
            .expect(2)
            .mount(&server)
            .await;

        let err = provider(&server).query("nobody").await.unwrap_err();
        assert!(matches!(err, ProviderError::ChannelNotFound(ref name) if name == "nobody"));
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "quotaExceeded" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).query("somechannel").await.unwrap_err();
        match err {
            ProviderError::ApiError { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "quotaExceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
