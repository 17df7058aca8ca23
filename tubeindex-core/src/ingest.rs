//! Ingestion pipeline
//!
//! Single-video ingestion runs metadata lookup, transcript resolution, encoding and the paired
//! append, short-circuiting on the first failure. Bulk ingestion walks a discovered candidate
//! list in order and records one outcome per candidate.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{ErrorKind, IndexError, UnavailableReason};
use crate::record::NewRecord;
use crate::source::{
    watch_url, DiscoveryRequest, SourceError, TranscriptCandidate, VideoDiscovery,
    VideoMetadataSource, VideoSummary,
};
use crate::storage::SemanticIndex;
use crate::transcript::{TranscriptError, TranscriptResolver};
use crate::vector::RecordId;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed id or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metadata lookup failed
    #[error("Video metadata error: {0}")]
    VideoMetadata(#[source] SourceError),

    /// Candidate discovery failed
    #[error("Discovery error: {0}")]
    Discovery(#[source] SourceError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl IngestError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InputValidation,
            Self::VideoMetadata(e) | Self::Discovery(e) => e.kind(),
            Self::Transcript(e) => e.kind(),
            Self::Index(e) => e.kind(),
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::Transcript(e) => e.reason(),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Maximum accepted id length
pub const MAX_ID_LEN: usize = 64;

/// Check a video or channel id: non-empty, `[A-Za-z0-9_-]`, at most 64 chars
pub fn validate_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(IngestError::invalid(format!("{} is required", what)));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if id.len() > MAX_ID_LEN || !id.chars().all(allowed) {
        return Err(IngestError::invalid(format!("invalid {}: {:?}", what, id)));
    }
    Ok(())
}

/// Success payload of a single ingestion
#[derive(Debug, Clone, Serialize)]
pub struct IngestedVideo {
    pub id: RecordId,
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub transcript_length: usize,
    pub segments: usize,
}

/// Per-candidate outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    Indexed,
    Failed,
    NoTranscript,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub status: IngestionStatus,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
}

/// Aggregate of a bulk run; `details` follows candidate order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkIngestionReport {
    pub indexed_count: usize,
    pub failed_count: usize,
    pub no_transcript_count: usize,
    pub total_attempted: usize,
    pub details: Vec<IngestionResult>,
}

impl BulkIngestionReport {
    fn push(&mut self, result: IngestionResult) {
        match result.status {
            IngestionStatus::Indexed => self.indexed_count += 1,
            IngestionStatus::Failed => self.failed_count += 1,
            IngestionStatus::NoTranscript => self.no_transcript_count += 1,
        }
        self.details.push(result);
    }
}

/// Where bulk candidates come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkSource {
    Channel(String),
    Query(String),
    /// Explicit ids, taken as given
    Videos(Vec<String>),
}

/// Discovered video with its caption tracks attached
#[derive(Debug, Clone, Serialize)]
pub struct VideoWithTranscripts {
    #[serde(flatten)]
    pub video: VideoSummary,
    pub transcript_info: Vec<TranscriptCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptScan {
    pub total_checked: usize,
    pub videos_with_transcripts: usize,
    pub videos: Vec<VideoWithTranscripts>,
}

struct Candidate {
    video_id: String,
    title: Option<String>,
}

/// Drives ingestion into a [`SemanticIndex`]
pub struct IngestionPipeline {
    index: Arc<SemanticIndex>,
    resolver: Arc<TranscriptResolver>,
    metadata: Arc<dyn VideoMetadataSource>,
    discovery: Arc<dyn VideoDiscovery>,
}

impl IngestionPipeline {
    pub fn new(
        index: Arc<SemanticIndex>,
        resolver: Arc<TranscriptResolver>,
        metadata: Arc<dyn VideoMetadataSource>,
        discovery: Arc<dyn VideoDiscovery>,
    ) -> Self {
        Self {
            index,
            resolver,
            metadata,
            discovery,
        }
    }

    pub fn index(&self) -> &Arc<SemanticIndex> {
        &self.index
    }

    pub fn resolver(&self) -> &Arc<TranscriptResolver> {
        &self.resolver
    }

    /// Index caller-supplied text directly
    pub fn index_video(
        &self,
        title: &str,
        transcript: &str,
        video_id: Option<&str>,
    ) -> Result<RecordId> {
        let mut record = NewRecord::new(title, transcript);
        if let Some(video_id) = video_id {
            validate_id("video_id", video_id)?;
            record = record.with_video_id(video_id).with_url(watch_url(video_id));
        }

        let id = self.index.index_text(record)?;
        log::info!("Indexed '{}' as record {}", title, id);
        Ok(id)
    }

    /// Fetch, encode and index one video
    pub async fn ingest_one(
        &self,
        video_id: &str,
        languages: Option<&[String]>,
    ) -> Result<IngestedVideo> {
        validate_id("video_id", video_id)?;

        let details = self
            .metadata
            .video_details(video_id)
            .await
            .map_err(IngestError::VideoMetadata)?;
        let transcript = self.resolver.resolve(video_id, languages).await?;

        let transcript_length = transcript.len();
        let segments = transcript.segments;
        let record = NewRecord::new(details.title.clone(), transcript.text)
            .with_video_id(video_id)
            .with_url(details.url.clone());
        let id = self.index.index_text(record)?;

        log::info!(
            "Indexed video {} ('{}') as record {}, {} chars",
            video_id,
            details.title,
            id,
            transcript_length
        );

        Ok(IngestedVideo {
            id,
            video_id: video_id.to_string(),
            title: details.title,
            url: details.url,
            transcript_length,
            segments,
        })
    }

    async fn candidates(&self, source: &BulkSource, max_videos: usize) -> Result<Vec<Candidate>> {
        let request = match source {
            BulkSource::Videos(ids) => {
                return Ok(ids
                    .iter()
                    .take(max_videos)
                    .map(|id| Candidate {
                        video_id: id.clone(),
                        title: None,
                    })
                    .collect());
            }
            BulkSource::Channel(channel_id) => {
                validate_id("channel_id", channel_id)?;
                DiscoveryRequest::Channel(channel_id.clone())
            }
            BulkSource::Query(query) => {
                if query.trim().is_empty() {
                    return Err(IngestError::invalid("query is required"));
                }
                DiscoveryRequest::Query(query.clone())
            }
        };

        if max_videos == 0 {
            return Ok(Vec::new());
        }

        let videos = self
            .discovery
            .discover(&request, max_videos)
            .await
            .map_err(IngestError::Discovery)?;

        Ok(videos
            .into_iter()
            .take(max_videos)
            .map(|v| Candidate {
                video_id: v.video_id,
                title: Some(v.title),
            })
            .collect())
    }

    /// Ingest candidates one by one, in discovery order.
    ///
    /// Per-item failures land in the report. Only discovery failures and invariant
    /// violations make the whole call fail.
    pub async fn ingest_bulk(
        &self,
        source: &BulkSource,
        max_videos: usize,
    ) -> Result<BulkIngestionReport> {
        let candidates = self.candidates(source, max_videos).await?;
        let mut report = BulkIngestionReport {
            total_attempted: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            let result = self.ingest_candidate(candidate).await?;
            report.push(result);
        }

        log::info!(
            "Bulk ingestion done: {} indexed, {} failed, {} without transcript, {} attempted",
            report.indexed_count,
            report.failed_count,
            report.no_transcript_count,
            report.total_attempted
        );
        Ok(report)
    }

    async fn ingest_candidate(&self, candidate: Candidate) -> Result<IngestionResult> {
        let Candidate { video_id, title } = candidate;
        let failed = |video_id: String, title: Option<String>, detail: String| IngestionResult {
            video_id,
            title,
            status: IngestionStatus::Failed,
            detail,
            transcript_length: None,
            id: None,
        };

        if let Err(e) = validate_id("video_id", &video_id) {
            return Ok(failed(video_id, title, e.to_string()));
        }

        let availability = self.resolver.check_availability(&video_id).await;
        if !availability.has_transcripts {
            let detail = availability
                .error
                .unwrap_or_else(|| "No transcripts available".to_string());
            return Ok(IngestionResult {
                video_id,
                title,
                status: IngestionStatus::NoTranscript,
                detail,
                transcript_length: None,
                id: None,
            });
        }

        match self.ingest_one(&video_id, None).await {
            Ok(ingested) => Ok(IngestionResult {
                video_id,
                title: Some(ingested.title),
                status: IngestionStatus::Indexed,
                detail: format!("Indexed {} characters", ingested.transcript_length),
                transcript_length: Some(ingested.transcript_length),
                id: Some(ingested.id),
            }),
            Err(e) if e.is_fatal() => {
                log::error!("Aborting bulk ingestion at {}: {}", video_id, e);
                Err(e)
            }
            Err(e) => {
                log::warn!("Failed to index {}: {}", video_id, e);
                Ok(failed(video_id, title, e.to_string()))
            }
        }
    }

    /// Discover videos and keep those that have caption tracks
    pub async fn find_with_transcripts(
        &self,
        request: &DiscoveryRequest,
        max_results: usize,
    ) -> Result<TranscriptScan> {
        match request {
            DiscoveryRequest::Channel(channel_id) => validate_id("channel_id", channel_id)?,
            DiscoveryRequest::Query(query) if query.trim().is_empty() => {
                return Err(IngestError::invalid("query is required"))
            }
            DiscoveryRequest::Query(_) => {}
        }

        let videos = if max_results == 0 {
            Vec::new()
        } else {
            self.discovery
                .discover(request, max_results)
                .await
                .map_err(IngestError::Discovery)?
        };

        let total_checked = videos.len();
        let mut found = Vec::new();
        for video in videos {
            let availability = self.resolver.check_availability(&video.video_id).await;
            if availability.has_transcripts {
                found.push(VideoWithTranscripts {
                    video,
                    transcript_info: availability.available_transcripts,
                });
            }
        }

        Ok(TranscriptScan {
            total_checked,
            videos_with_transcripts: found.len(),
            videos: found,
        })
    }
}
