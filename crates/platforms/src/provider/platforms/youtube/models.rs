use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope of every Data API v3 list response.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchId,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LiveStreamingDetails {
    pub actual_start_time: Option<DateTime<Utc>>,
    /// The API encodes this number as a string.
    pub concurrent_viewers: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoItem {
    #[serde(default)]
    pub snippet: VideoSnippet,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

impl VideoItem {
    pub fn thumbnail_url(&self) -> Option<&str> {
        let thumbnails = &self.snippet.thumbnails;
        thumbnails
            .medium
            .as_ref()
            .or(thumbnails.high.as_ref())
            .map(|t| t.url.as_str())
    }

    /// Concurrent viewers, zero when absent or unparsable.
    pub fn viewers(&self) -> u64 {
        self.live_streaming_details
            .as_ref()
            .and_then(|d| d.concurrent_viewers.as_deref())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.live_streaming_details
            .as_ref()
            .and_then(|d| d.actual_start_time)
    }
}

/// Error body of the Data API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "items": [{
                "kind": "youtube#searchResult",
                "id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"},
                "snippet": {"title": "live now"}
            }]
        }"#;
        let response: ListResponse<SearchItem> = serde_json::from_str(body).unwrap();
        assert_eq!(response.items[0].id.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_parse_missing_items() {
        let response: ListResponse<ChannelItem> =
            serde_json::from_str(r#"{"kind": "youtube#channelListResponse"}"#).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_video_details() {
        let body = r#"{
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Building things",
                "thumbnails": {
                    "medium": {"url": "https://i.ytimg.com/vi/x/mqdefault_live.jpg"},
                    "high": {"url": "https://i.ytimg.com/vi/x/hqdefault_live.jpg"}
                }
            },
            "liveStreamingDetails": {
                "actualStartTime": "2024-05-01T18:00:00Z",
                "concurrentViewers": "1534"
            }
        }"#;
        let video: VideoItem = serde_json::from_str(body).unwrap();
        assert_eq!(video.viewers(), 1534);
        assert_eq!(
            video.thumbnail_url(),
            Some("https://i.ytimg.com/vi/x/mqdefault_live.jpg")
        );
        assert!(video.started_at().is_some());
    }

    #[test]
    fn test_video_without_viewers() {
        let video: VideoItem =
            serde_json::from_str(r#"{"snippet": {"title": "t"}, "liveStreamingDetails": {"concurrentViewers": "n/a"}}"#)
                .unwrap();
        assert_eq!(video.viewers(), 0);
        assert_eq!(video.thumbnail_url(), None);
    }
}
