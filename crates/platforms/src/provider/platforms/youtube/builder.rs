use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{ApiErrorResponse, ChannelItem, ListResponse, SearchItem, VideoItem};
use crate::provider::error::ProviderError;
use crate::provider::status_provider::{ProviderCredentials, StatusProvider, non_empty};
use crate::status::{Platform, StreamStatus};

/// YouTube Data API v3 status provider.
///
/// A registered username is resolved to a channel id first as a legacy
/// username, then as a literal channel id. Resolved ids are cached for the
/// lifetime of the provider.
pub struct YoutubeProvider {
    client: Client,
    api_key: RwLock<Option<String>>,
    channel_ids: RwLock<HashMap<String, String>>,
    base_url: String,
}

impl YoutubeProvider {
    const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, Self::BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: RwLock::new(None),
            channel_ids: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    fn api_key(&self) -> Result<String, ProviderError> {
        self.api_key
            .read()
            .clone()
            .ok_or(ProviderError::MissingCredentials("YouTube API key"))
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        api_key: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, ProviderError> {
        let url = format!("{}/{}", self.base_url, resource);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListResponse<T> = response.json().await?;
        Ok(body.items)
    }

    async fn resolve_channel_id(&self, api_key: &str, username: &str) -> Result<String, ProviderError> {
        let key = username.to_lowercase();
        if let Some(id) = self.channel_ids.read().get(&key) {
            return Ok(id.clone());
        }

        let mut channels: Vec<ChannelItem> = self
            .list(
                "channels",
                api_key,
                &[("part", "id"), ("forUsername", username)],
            )
            .await?;
        if channels.is_empty() {
            channels = self
                .list("channels", api_key, &[("part", "id"), ("id", username)])
                .await?;
        }

        let id = channels
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| ProviderError::ChannelNotFound(username.to_string()))?;

        debug!(username, channel_id = %id, "Resolved YouTube channel");
        self.channel_ids.write().insert(key, id.clone());
        Ok(id)
    }

    async fn live_video(&self, api_key: &str, channel_id: &str) -> Result<Option<VideoItem>, ProviderError> {
        let results: Vec<SearchItem> = self
            .list(
                "search",
                api_key,
                &[
                    ("part", "id"),
                    ("channelId", channel_id),
                    ("type", "video"),
                    ("eventType", "live"),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        let Some(video_id) = results.into_iter().find_map(|r| r.id.video_id) else {
            return Ok(None);
        };

        let videos: Vec<VideoItem> = self
            .list(
                "videos",
                api_key,
                &[("part", "snippet,liveStreamingDetails"), ("id", &video_id)],
            )
            .await?;
        Ok(videos.into_iter().next())
    }

    fn to_status(video: Option<VideoItem>) -> StreamStatus {
        match video {
            Some(video) => {
                let mut builder = StreamStatus::live()
                    .title(video.snippet.title.as_str())
                    .viewer_count(video.viewers())
                    .started_at(video.started_at());
                if let Some(url) = video.thumbnail_url() {
                    builder = builder.thumbnail_url(url);
                }
                builder.build()
            }
            None => StreamStatus::offline(),
        }
    }
}

#[async_trait]
impl StatusProvider for YoutubeProvider {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn configure(&self, credentials: &ProviderCredentials) {
        let next = non_empty(credentials.youtube_api_key.as_ref());
        let mut current = self.api_key.write();
        if *current != next {
            debug!("YouTube API key changed");
            *current = next;
        }
    }

    async fn query(&self, username: &str) -> Result<StreamStatus, ProviderError> {
        let api_key = self.api_key()?;
        let channel_id = self.resolve_channel_id(&api_key, username).await?;
        let video = self.live_video(&api_key, &channel_id).await?;
        debug!(username, live = video.is_some(), "YouTube status fetched");
        Ok(Self::to_status(video))
    }
}
