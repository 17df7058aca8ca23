//! Vector embedding engine
//!
//! High-level API for generating and caching embeddings.

use super::discovery::find_model_cache_dir;
use super::encoder::EmbeddingEncoder;
use super::minilm::FastEmbedEncoder;
use crate::error::{IndexError, Result};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

/// Vector embedding engine with caching
///
/// Wraps an [`EmbeddingEncoder`] with a DashMap cache and enforces the process-wide dimension.
pub struct VectorEngine {
    encoder: Arc<dyn EmbeddingEncoder>,
    cache: DashMap<String, Vec<f32>>,
    dimension: usize,
}

impl VectorEngine {
    /// Create VectorEngine around an existing encoder
    pub fn new(encoder: Arc<dyn EmbeddingEncoder>) -> Self {
        let dimension = encoder.dimension();
        Self {
            encoder,
            cache: DashMap::new(),
            dimension,
        }
    }

    /// Create VectorEngine backed by fastembed
    ///
    /// # Arguments
    /// * `models_dir` - Optional explicit model cache directory
    pub fn fastembed(models_dir: Option<&Path>) -> Result<Self> {
        let cache_dir = find_model_cache_dir(models_dir)?;
        let encoder = FastEmbedEncoder::new(&cache_dir)?;

        log::info!(
            "VectorEngine ready ({}d, {})",
            encoder.dimension(),
            encoder.model_name()
        );

        Ok(Self::new(Arc::new(encoder)))
    }

    /// Generate embedding with caching
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.value().clone());
        }

        let embedding = self.encoder.encode(text)?;
        self.check_dimension(&embedding)?;
        self.cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
