//! Collaborator boundaries
//!
//! The captioning service, the video metadata service, the discovery (search/list) service,
//! the channel directory and the comment service are reached through these traits. Concrete HTTP clients live in the server crate;
//! tests plug in in-memory stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::transcript::TranscriptError;

/// One caption track, described without its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptCandidate {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// One timed caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Video metadata as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub channel: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// Discovery result entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub published_at: String,
    pub description: String,
}

/// Channel-level counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub subscribers: u64,
    pub views: u64,
    pub videos: u64,
}

/// A channel found by name or handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub channel_id: String,
    pub channel_title: String,
}

/// One top-level comment, as plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoComment {
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub published_at: String,
}

/// What to discover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryRequest {
    /// Keyword search, ordered by relevance
    Query(String),
    /// Latest uploads of a channel, newest first
    Channel(String),
}

/// Errors reported by the metadata and discovery collaborators
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Upstream(_) | Self::InvalidResponse(_) => ErrorKind::UpstreamServiceError,
        }
    }
}

/// Captioning collaborator
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Tracks available for a video, in the order the service reports them
    async fn list_transcripts(
        &self,
        video_id: &str,
    ) -> Result<Vec<TranscriptCandidate>, TranscriptError>;

    /// Timed text of one track
    async fn fetch(
        &self,
        video_id: &str,
        track: &TranscriptCandidate,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

/// Video metadata collaborator
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    async fn video_details(&self, video_id: &str) -> Result<VideoDetails, SourceError>;
}

/// Discovery collaborator
#[async_trait]
pub trait VideoDiscovery: Send + Sync {
    /// Candidate videos in service order, at most `max_results`
    async fn discover(
        &self,
        request: &DiscoveryRequest,
        max_results: usize,
    ) -> Result<Vec<VideoSummary>, SourceError>;
}

/// Channel lookups
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    async fn channel_stats(&self, channel_id: &str) -> Result<ChannelStats, SourceError>;

    /// Best match for a channel name or handle
    async fn find_channel(&self, name: &str) -> Result<ChannelRef, SourceError>;
}

/// Comment collaborator
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Top-level comments in service order, at most `max_results`
    async fn top_comments(
        &self,
        video_id: &str,
        max_results: usize,
    ) -> Result<Vec<VideoComment>, SourceError>;
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
