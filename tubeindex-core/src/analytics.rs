//! Video statistics: side-by-side comparison and search-then-rank.
//!
//! Read-only; nothing here touches the index.

use serde::Serialize;
use std::sync::Arc;

use crate::ingest::{validate_id, IngestError, Result};
use crate::source::{DiscoveryRequest, VideoDetails, VideoDiscovery, VideoMetadataSource};

/// Engagement counters of one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoStats {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl From<VideoDetails> for VideoStats {
    fn from(details: VideoDetails) -> Self {
        Self {
            video_id: details.video_id,
            title: details.title,
            url: details.url,
            views: details.view_count,
            likes: details.like_count,
            comments: details.comment_count,
        }
    }
}

/// One row of a comparison; a failed lookup keeps its slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Comparison {
    Found(VideoStats),
    Failed { video_id: String, error: String },
}

/// Search results with full details, plus the leader on each counter
#[derive(Debug, Clone, Serialize)]
pub struct SearchAnalysis {
    pub query: String,
    pub total_videos: usize,
    pub most_viewed: Option<VideoDetails>,
    pub most_liked: Option<VideoDetails>,
    pub most_commented: Option<VideoDetails>,
    pub all_videos: Vec<VideoDetails>,
}

impl SearchAnalysis {
    pub fn new(query: impl Into<String>, videos: Vec<VideoDetails>) -> Self {
        Self {
            query: query.into(),
            total_videos: videos.len(),
            most_viewed: leader(&videos, |v| v.view_count),
            most_liked: leader(&videos, |v| v.like_count),
            most_commented: leader(&videos, |v| v.comment_count),
            all_videos: videos,
        }
    }
}

/// Highest `metric`; the earliest video wins a tie
fn leader(videos: &[VideoDetails], metric: impl Fn(&VideoDetails) -> u64) -> Option<VideoDetails> {
    videos
        .iter()
        .fold(None::<&VideoDetails>, |best, video| match best {
            Some(best) if metric(best) >= metric(video) => Some(best),
            _ => Some(video),
        })
        .cloned()
}

pub struct VideoAnalytics {
    metadata: Arc<dyn VideoMetadataSource>,
    discovery: Arc<dyn VideoDiscovery>,
}

impl VideoAnalytics {
    pub fn new(metadata: Arc<dyn VideoMetadataSource>, discovery: Arc<dyn VideoDiscovery>) -> Self {
        Self {
            metadata,
            discovery,
        }
    }

    pub async fn stats(&self, video_id: &str) -> Result<VideoStats> {
        validate_id("video_id", video_id)?;
        let details = self
            .metadata
            .video_details(video_id)
            .await
            .map_err(IngestError::VideoMetadata)?;
        Ok(details.into())
    }

    /// Stats for each id, in input order
    pub async fn compare(&self, video_ids: &[String]) -> Vec<Comparison> {
        let mut rows = Vec::with_capacity(video_ids.len());
        for video_id in video_ids {
            let row = match self.stats(video_id).await {
                Ok(stats) => Comparison::Found(stats),
                Err(e) => {
                    log::warn!("Skipping stats for {}: {}", video_id, e);
                    Comparison::Failed {
                        video_id: video_id.clone(),
                        error: e.to_string(),
                    }
                }
            };
            rows.push(row);
        }
        rows
    }

    /// Search, then fetch details for every hit. Hits whose details fail are left out.
    pub async fn search_and_analyze(&self, query: &str, max_results: usize) -> Result<SearchAnalysis> {
        if query.trim().is_empty() {
            return Err(IngestError::invalid("query must not be empty"));
        }
        if max_results == 0 {
            return Ok(SearchAnalysis::new(query, Vec::new()));
        }

        let hits = self
            .discovery
            .discover(&DiscoveryRequest::Query(query.to_string()), max_results)
            .await
            .map_err(IngestError::Discovery)?;

        let mut videos = Vec::with_capacity(hits.len());
        for hit in hits.iter().take(max_results) {
            match self.metadata.video_details(&hit.video_id).await {
                Ok(details) => videos.push(details),
                Err(e) => log::warn!("No details for {}: {}", hit.video_id, e),
            }
        }

        log::info!(
            "Analyzed {} of {} videos for '{}'",
            videos.len(),
            hits.len(),
            query
        );
        Ok(SearchAnalysis::new(query, videos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::{watch_url, SourceError, VideoSummary};
    use async_trait::async_trait;

    fn details(video_id: &str, views: u64, likes: u64, comments: u64) -> VideoDetails {
        VideoDetails {
            video_id: video_id.to_string(),
            title: format!("Title {}", video_id),
            url: watch_url(video_id),
            description: String::new(),
            channel: "Stub".to_string(),
            published_at: String::new(),
            view_count: views,
            like_count: likes,
            comment_count: comments,
        }
    }

    /// a: most views, b: most likes, c: ties a on comments, gone: not found upstream
    struct Catalog;

    #[async_trait]
    impl VideoMetadataSource for Catalog {
        async fn video_details(&self, video_id: &str) -> std::result::Result<VideoDetails, SourceError> {
            match video_id {
                "a" => Ok(details("a", 900, 10, 5)),
                "b" => Ok(details("b", 100, 50, 1)),
                "c" => Ok(details("c", 300, 20, 5)),
                _ => Err(SourceError::NotFound(format!("video {}", video_id))),
            }
        }
    }

    #[async_trait]
    impl VideoDiscovery for Catalog {
        async fn discover(
            &self,
            _request: &DiscoveryRequest,
            max_results: usize,
        ) -> std::result::Result<Vec<VideoSummary>, SourceError> {
            Ok(["a", "gone", "b", "c"]
                .iter()
                .take(max_results)
                .map(|id| VideoSummary {
                    video_id: id.to_string(),
                    title: String::new(),
                    url: watch_url(id),
                    channel: None,
                    published_at: String::new(),
                    description: String::new(),
                })
                .collect())
        }
    }

    fn analytics() -> VideoAnalytics {
        let catalog = Arc::new(Catalog);
        VideoAnalytics::new(catalog.clone(), catalog)
    }

    #[tokio::test]
    async fn test_stats_maps_counters() {
        let stats = analytics().stats("b").await.unwrap();
        assert_eq!(stats.views, 100);
        assert_eq!(stats.likes, 50);
        assert_eq!(stats.comments, 1);
        assert_eq!(stats.title, "Title b");

        let err = analytics().stats("gone").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = analytics().stats("bad id!").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }

    #[tokio::test]
    async fn test_compare_keeps_order_and_failed_rows() {
        let ids = vec!["c".to_string(), "gone".to_string(), "a".to_string()];
        let rows = analytics().compare(&ids).await;

        assert_eq!(rows.len(), 3);
        assert!(matches!(&rows[0], Comparison::Found(s) if s.video_id == "c"));
        assert!(matches!(&rows[1], Comparison::Failed { video_id, .. } if video_id == "gone"));
        assert!(matches!(&rows[2], Comparison::Found(s) if s.views == 900));

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["video_id"], "gone");
        assert!(json["error"].as_str().unwrap().contains("Not found"));
    }

    #[tokio::test]
    async fn test_search_and_analyze_ranks_leaders() {
        let analysis = analytics().search_and_analyze("rust", 10).await.unwrap();

        assert_eq!(analysis.total_videos, 3);
        assert_eq!(analysis.most_viewed.as_ref().unwrap().video_id, "a");
        assert_eq!(analysis.most_liked.as_ref().unwrap().video_id, "b");
        // a and c tie on comments; the earlier hit wins
        assert_eq!(analysis.most_commented.as_ref().unwrap().video_id, "a");
        let order: Vec<_> = analysis.all_videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_search_and_analyze_edges() {
        let empty = analytics().search_and_analyze("rust", 0).await.unwrap();
        assert_eq!(empty.total_videos, 0);
        assert!(empty.most_viewed.is_none());

        let err = analytics().search_and_analyze("  ", 5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }
}
