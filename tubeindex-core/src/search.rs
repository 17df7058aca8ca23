//! Semantic search over indexed transcripts
//!
//! Encodes the query, scans the vector index and joins each neighbor with its metadata.

use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::storage::SemanticIndex;
use crate::vector::RecordId;

/// Display similarity derived from the index's native (squared L2) distance.
///
/// `round(100 / (1 + distance), 2)`: 100.0 at distance 0, decreasing towards 0 as the
/// distance grows. This is a presentation score, not a calibrated probability and not
/// cosine similarity.
pub fn similarity(distance: f32) -> f64 {
    let distance = f64::from(distance.max(0.0));
    let score = 100.0 / (1.0 + distance);
    (score * 100.0).round() / 100.0
}

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum results to return (default: 3)
    pub top_k: usize,
    /// Attach the stored transcript to each hit
    pub include_full_text: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            include_full_text: false,
        }
    }
}

/// One ranked result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: RecordId,
    pub title: String,
    pub video_id: Option<String>,
    pub url: Option<String>,
    pub distance: f32,
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// Outcome of a search: "nothing indexed yet" is distinct from "no matches"
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    NotIndexedYet,
    Hits(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn hits(&self) -> Option<&[SearchHit]> {
        match self {
            Self::NotIndexedYet => None,
            Self::Hits(hits) => Some(hits),
        }
    }
}

/// Search front-end over a [`SemanticIndex`]
pub struct TranscriptSearch {
    index: Arc<SemanticIndex>,
}

impl TranscriptSearch {
    pub fn new(index: Arc<SemanticIndex>) -> Self {
        Self { index }
    }

    /// Rank indexed transcripts by meaning, nearest first
    pub fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchOutcome> {
        let count = self.index.len();
        if count == 0 {
            return Ok(SearchOutcome::NotIndexedYet);
        }

        let query_embedding = self.index.engine().embed(query)?;
        let neighbors = self
            .index
            .nearest(&query_embedding, config.top_k.min(count))?;

        let hits = neighbors
            .into_iter()
            .map(|(neighbor, record)| SearchHit {
                id: record.id,
                title: record.title,
                video_id: record.video_id,
                url: record.url,
                distance: neighbor.distance,
                similarity_score: similarity(neighbor.distance),
                transcript: config.include_full_text.then_some(record.transcript),
            })
            .collect::<Vec<_>>();

        log::info!(
            "Semantic search performed for: {} | full_transcript={} | hits={}",
            query,
            config.include_full_text,
            hits.len()
        );

        Ok(SearchOutcome::Hits(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewRecord;
    use crate::storage::tests::test_index;

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity(0.0), 100.0);
        assert_eq!(similarity(1.0), 50.0);
        assert_eq!(similarity(3.0), 25.0);
        assert_eq!(similarity(2.0), 33.33);
        assert!(similarity(1e9) < 0.01);
    }

    #[test]
    fn test_similarity_monotonic() {
        let scores: Vec<f64> = [0.0, 0.1, 0.5, 1.0, 4.0, 40.0]
            .iter()
            .map(|d| similarity(*d))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_empty_index_is_not_ready() {
        let search = TranscriptSearch::new(Arc::new(test_index()));
        let outcome = search.search("anything", &SearchConfig::default()).unwrap();
        assert!(matches!(outcome, SearchOutcome::NotIndexedYet));
        assert!(outcome.hits().is_none());
    }

    #[test]
    fn test_exact_text_scores_100() {
        let index = Arc::new(test_index());
        index.index_text(NewRecord::new("T", "hello world")).unwrap();
        let search = TranscriptSearch::new(Arc::clone(&index));

        let outcome = search.search("hello world", &SearchConfig::default()).unwrap();
        let hits = outcome.hits().unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "T");
        assert_eq!(hits[0].similarity_score, 100.0);
        assert!(hits[0].transcript.is_none());
    }

    #[test]
    fn test_top_k_clamped_and_ordered() {
        let index = Arc::new(test_index());
        index.index_text(NewRecord::new("far", "zebra zebra zebra")).unwrap();
        index.index_text(NewRecord::new("near", "rust programming")).unwrap();
        index.index_text(NewRecord::new("mid", "rust zebra")).unwrap();
        let search = TranscriptSearch::new(index);

        let config = SearchConfig {
            top_k: 10,
            include_full_text: true,
        };
        let outcome = search.search("rust programming", &config).unwrap();
        let hits = outcome.hits().unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "near");
        assert!(hits
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));
        assert_eq!(hits[0].transcript.as_deref(), Some("rust programming"));
    }

    #[test]
    fn test_zero_top_k_returns_empty_hits() {
        let index = Arc::new(test_index());
        index.index_text(NewRecord::new("T", "hello")).unwrap();
        let search = TranscriptSearch::new(index);

        let config = SearchConfig {
            top_k: 0,
            ..Default::default()
        };
        let outcome = search.search("hello", &config).unwrap();
        assert_eq!(outcome.hits().map(|h| h.len()), Some(0));
    }
}
