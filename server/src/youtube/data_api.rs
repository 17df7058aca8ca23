//! YouTube Data API v3 client
//!
//! Implements [`VideoMetadataSource`] (`videos`), [`VideoDiscovery`] (`search`),
//! [`ChannelDirectory`] (`channels`, `search type=channel`) and [`CommentSource`]
//! (`commentThreads`).

use async_trait::async_trait;
use html_escape::decode_html_entities;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tubeindex_core::{
    watch_url, ChannelDirectory, ChannelRef, ChannelStats, CommentSource, DiscoveryRequest,
    SourceError, VideoComment, VideoDetails, VideoDiscovery, VideoMetadataSource, VideoSummary,
};

/// Public API endpoint
pub const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The search endpoint's page size limit
pub const MAX_RESULTS_LIMIT: usize = 50;

/// The commentThreads endpoint's page size limit
pub const MAX_COMMENTS_LIMIT: usize = 100;

pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point at another endpoint (proxies, local fakes)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::Upstream(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Upstream(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(SourceError::Upstream(format!(
                "{} returned {}: {}",
                endpoint,
                status,
                api_error_message(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            SourceError::InvalidResponse(format!("Failed to parse {} response: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl VideoMetadataSource for YouTubeDataApi {
    async fn video_details(&self, video_id: &str) -> Result<VideoDetails, SourceError> {
        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", video_id.to_string()),
        ];
        let response: VideoListResponse = self.get_json("videos", &params).await?;

        response
            .items
            .into_iter()
            .next()
            .map(VideoDetails::from)
            .ok_or_else(|| SourceError::NotFound(format!("video {}", video_id)))
    }
}

#[async_trait]
impl VideoDiscovery for YouTubeDataApi {
    async fn discover(
        &self,
        request: &DiscoveryRequest,
        max_results: usize,
    ) -> Result<Vec<VideoSummary>, SourceError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let response: SearchResponse = self
            .get_json("search", &search_params(request, max_results))
            .await?;

        let mut videos = summaries(response);
        videos.truncate(max_results);
        Ok(videos)
    }
}

#[async_trait]
impl ChannelDirectory for YouTubeDataApi {
    async fn channel_stats(&self, channel_id: &str) -> Result<ChannelStats, SourceError> {
        let params = [
            ("part", "statistics".to_string()),
            ("id", channel_id.to_string()),
        ];
        let response: ChannelListResponse = self.get_json("channels", &params).await?;

        response
            .items
            .into_iter()
            .next()
            .map(ChannelStats::from)
            .ok_or_else(|| SourceError::NotFound(format!("channel {}", channel_id)))
    }

    async fn find_channel(&self, name: &str) -> Result<ChannelRef, SourceError> {
        let params = [
            ("part", "snippet".to_string()),
            ("type", "channel".to_string()),
            ("maxResults", "1".to_string()),
            ("q", name.to_string()),
        ];
        let response: SearchResponse = self.get_json("search", &params).await?;

        response
            .items
            .into_iter()
            .find_map(|item| {
                let channel_id = item.snippet.channel_id.or(item.id.channel_id)?;
                Some(ChannelRef {
                    channel_id,
                    channel_title: decode(&item.snippet.title),
                })
            })
            .ok_or_else(|| SourceError::NotFound(format!("channel '{}'", name)))
    }
}

#[async_trait]
impl CommentSource for YouTubeDataApi {
    async fn top_comments(
        &self,
        video_id: &str,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, SourceError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let params = [
            ("part", "snippet".to_string()),
            ("videoId", video_id.to_string()),
            ("textFormat", "plainText".to_string()),
            (
                "maxResults",
                max_results.clamp(1, MAX_COMMENTS_LIMIT).to_string(),
            ),
        ];
        let response: CommentThreadResponse = self.get_json("commentThreads", &params).await?;

        let mut comments: Vec<VideoComment> = response
            .items
            .into_iter()
            .map(|thread| VideoComment::from(thread.snippet.top_level_comment.snippet))
            .collect();
        comments.truncate(max_results);
        Ok(comments)
    }
}

fn decode(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

fn search_params(request: &DiscoveryRequest, max_results: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("part", "snippet".to_string()),
        ("type", "video".to_string()),
        (
            "maxResults",
            max_results.clamp(1, MAX_RESULTS_LIMIT).to_string(),
        ),
    ];
    match request {
        DiscoveryRequest::Query(query) => {
            params.push(("q", query.clone()));
            params.push(("order", "relevance".to_string()));
        }
        DiscoveryRequest::Channel(channel_id) => {
            params.push(("channelId", channel_id.clone()));
            params.push(("order", "date".to_string()));
        }
    }
    params
}

fn summaries(response: SearchResponse) -> Vec<VideoSummary> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            Some(VideoSummary {
                url: watch_url(&video_id),
                video_id,
                title: decode(&item.snippet.title),
                channel: item.snippet.channel_title.map(|c| decode(&c)),
                published_at: item.snippet.published_at,
                description: decode(&item.snippet.description),
            })
        })
        .collect()
}

/// Best-effort extraction of `error.message` from an API error body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

// =============================================================================
// Data API Types
// =============================================================================

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    published_at: String,
}

/// Counts arrive as decimal strings and may be hidden by the uploader
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

fn count(value: Option<String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl From<VideoItem> for VideoDetails {
    fn from(item: VideoItem) -> Self {
        Self {
            url: watch_url(&item.id),
            video_id: item.id,
            title: item.snippet.title,
            description: item.snippet.description,
            channel: item.snippet.channel_title.unwrap_or_default(),
            published_at: item.snippet.published_at,
            view_count: count(item.statistics.view_count),
            like_count: count(item.statistics.like_count),
            comment_count: count(item.statistics.comment_count),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    statistics: ChannelStatistics,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    view_count: Option<String>,
    video_count: Option<String>,
}

impl From<ChannelItem> for ChannelStats {
    fn from(item: ChannelItem) -> Self {
        Self {
            channel_id: item.id,
            subscribers: count(item.statistics.subscriber_count),
            views: count(item.statistics.view_count),
            videos: count(item.statistics.video_count),
        }
    }
}

#[derive(Deserialize)]
struct CommentThreadResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    published_at: String,
}

impl From<CommentSnippet> for VideoComment {
    fn from(snippet: CommentSnippet) -> Self {
        Self {
            author: snippet.author_display_name,
            text: snippet.text_display,
            likes: snippet.like_count,
            published_at: snippet.published_at,
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
