//! In-memory semantic index
//!
//! Owns the encoder, the vector index and the metadata store. The two stores live behind a
//! single lock so every append extends both or neither.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::embedding::VectorEngine;
use crate::error::{IndexError, Result};
use crate::record::{IndexedRecord, MetadataStore, NewRecord};
use crate::vector::{Neighbor, RecordId, VectorIndex};

struct IndexState {
    vectors: VectorIndex,
    records: MetadataStore,
}

impl IndexState {
    fn check_aligned(&self) -> Result<()> {
        if self.vectors.len() != self.records.len() {
            return Err(IndexError::invariant(format!(
                "vector index holds {} entries but metadata store holds {}",
                self.vectors.len(),
                self.records.len()
            )));
        }
        Ok(())
    }
}

/// Summary row for listing records without their transcripts
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub transcript_length: usize,
}

/// Index statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_records: usize,
    pub dimension: usize,
    pub model: String,
    pub cached_embeddings: usize,
}

/// Semantic index context: encoder + vector index + metadata store
///
/// Created empty; grows only through [`append`](Self::append). Nothing is persisted.
pub struct SemanticIndex {
    engine: Arc<VectorEngine>,
    state: RwLock<IndexState>,
}

impl SemanticIndex {
    pub fn new(engine: Arc<VectorEngine>) -> Self {
        let dimension = engine.dimension();
        log::info!("SemanticIndex created ({}d, {})", dimension, engine.model_name());

        Self {
            engine,
            state: RwLock::new(IndexState {
                vectors: VectorIndex::new(dimension),
                records: MetadataStore::new(),
            }),
        }
    }

    /// Get the vector engine reference
    pub fn engine(&self) -> &Arc<VectorEngine> {
        &self.engine
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode `record.transcript` and append it
    pub fn index_text(&self, record: NewRecord) -> Result<RecordId> {
        let vector = self.engine.embed(&record.transcript)?;
        self.append(vector, record)
    }

    /// Append a vector and its record as one unit.
    ///
    /// The vector is validated before either store is touched, so a rejected append leaves
    /// no trace. A misaligned pair is reported as [`IndexError::InvariantViolation`].
    pub fn append(&self, vector: Vec<f32>, record: NewRecord) -> Result<RecordId> {
        let mut state = self.state.write();
        state.check_aligned()?;
        state.vectors.validate(&vector)?;

        let vector_id = state.vectors.add(&vector)?;
        let record_id = state.records.append(record);
        if vector_id != record_id {
            log::error!(
                "Index ids diverged: vector {} vs record {}",
                vector_id,
                record_id
            );
            return Err(IndexError::invariant(format!(
                "vector id {} != record id {}",
                vector_id, record_id
            )));
        }

        log::debug!("Indexed record {}", record_id);
        Ok(record_id)
    }

    /// Get a record by id
    pub fn get(&self, id: RecordId) -> Result<IndexedRecord> {
        self.state.read().records.get(id).cloned()
    }

    /// Nearest records to `query`, joined with their metadata under one read lock
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(Neighbor, IndexedRecord)>> {
        let state = self.state.read();
        state.check_aligned()?;

        state
            .vectors
            .search(query, k)?
            .into_iter()
            .map(|neighbor| {
                let record = state.records.get(neighbor.id).map_err(|_| {
                    IndexError::invariant(format!("no metadata for vector {}", neighbor.id))
                })?;
                Ok((neighbor, record.clone()))
            })
            .collect()
    }

    /// All records in id order, without transcripts
    pub fn records(&self) -> Vec<RecordSummary> {
        self.state
            .read()
            .records
            .iter()
            .map(|r| RecordSummary {
                id: r.id,
                title: r.title.clone(),
                video_id: r.video_id.clone(),
                url: r.url.clone(),
                transcript_length: r.transcript.chars().count(),
            })
            .collect()
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_records: self.len(),
            dimension: self.engine.dimension(),
            model: self.engine.model_name().to_string(),
            cached_embeddings: self.engine.cache_size(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embedding::EmbeddingEncoder;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    /// Deterministic bag-of-words encoder for tests
    pub(crate) struct HashEncoder;

    impl EmbeddingEncoder for HashEncoder {
        fn encode(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0; 8];
            for word in text.split_whitespace() {
                let mut hasher = DefaultHasher::new();
                word.to_lowercase().hash(&mut hasher);
                v[(hasher.finish() % 8) as usize] += 1.0;
            }
            Ok(v)
        }

        fn dimension(&self) -> usize {
            8
        }

        fn model_name(&self) -> &str {
            "hash-8"
        }
    }

    pub(crate) fn test_index() -> SemanticIndex {
        SemanticIndex::new(Arc::new(VectorEngine::new(Arc::new(HashEncoder))))
    }

    #[test]
    fn test_index_text_assigns_sequential_ids() {
        let index = test_index();
        assert!(index.is_empty());

        assert_eq!(index.index_text(NewRecord::new("a", "alpha")).unwrap(), 0);
        assert_eq!(index.index_text(NewRecord::new("b", "beta")).unwrap(), 1);
        assert_eq!(index.index_text(NewRecord::new("c", "alpha")).unwrap(), 2);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(2).unwrap().title, "c");
    }

    #[test]
    fn test_rejected_append_leaves_both_stores_untouched() {
        let index = test_index();
        index.index_text(NewRecord::new("a", "alpha")).unwrap();

        let err = index
            .append(vec![1.0; 3], NewRecord::new("bad", "bad"))
            .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));

        assert_eq!(index.len(), 1);
        assert!(index.get(1).is_err());
        assert_eq!(index.nearest(&[0.0; 8], 10).unwrap().len(), 1);
    }

    #[test]
    fn test_nearest_joins_metadata() {
        let index = test_index();
        index.index_text(NewRecord::new("T", "hello world")).unwrap();
        index.index_text(NewRecord::new("U", "something else")).unwrap();

        let query = index.engine().embed("hello world").unwrap();
        let hits = index.nearest(&query, 5).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.distance, 0.0);
        assert_eq!(hits[0].1.title, "T");
    }

    #[test]
    fn test_records_and_stats() {
        let index = test_index();
        index
            .index_text(NewRecord::new("T", "hello world").with_video_id("vid1"))
            .unwrap();

        let records = index.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transcript_length, 11);
        assert_eq!(records[0].video_id.as_deref(), Some("vid1"));

        let stats = index.stats();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.dimension, 8);
        assert_eq!(stats.model, "hash-8");
    }

    #[test]
    fn test_concurrent_appends_stay_aligned() {
        let index = Arc::new(test_index());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        index
                            .index_text(NewRecord::new(format!("{t}-{i}"), format!("w{t} w{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 200);
        for id in 0..200 {
            assert_eq!(index.get(id).unwrap().id, id);
        }
    }
}
