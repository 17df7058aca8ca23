//! fastembed sentence embeddings
//!
//! ONNX all-MiniLM-L6-v2, the same sentence-transformers model the index was designed around.

use super::encoder::EmbeddingEncoder;
use crate::error::{IndexError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::Path;

const MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Longer input is truncated by the model
const MAX_LENGTH: usize = 256;

/// fastembed model wrapper
///
/// The ONNX session is not shared across threads without a guard, so calls are serialized.
pub struct FastEmbedEncoder {
    model: Mutex<TextEmbedding>,
    dimension: usize,
}

impl FastEmbedEncoder {
    /// Load the model, downloading it into `cache_dir` on first use
    pub fn new(cache_dir: &Path) -> Result<Self> {
        log::info!("Loading {} (cache: {})", MODEL_NAME, cache_dir.display());

        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_max_length(MAX_LENGTH)
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .map(Mutex::new)
            .map_err(|e| IndexError::model(format!("Failed to load {}: {}", MODEL_NAME, e)))?;

        // Get dimension by encoding test string
        let sample = model
            .lock()
            .embed(vec!["test"], None)
            .map_err(|e| IndexError::model(format!("Failed to encode test string: {}", e)))?;
        let dimension = sample
            .first()
            .map(|v| v.len())
            .ok_or_else(|| IndexError::model("Model returned no embedding for test string"))?;

        log::info!(
            "Loaded {} ({}d, max {} tokens)",
            MODEL_NAME,
            dimension,
            MAX_LENGTH
        );

        Ok(Self { model, dimension })
    }
}

impl EmbeddingEncoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self
            .model
            .lock()
            .embed(vec![text], None)
            .map_err(|e| IndexError::embedding(format!("Failed to encode text: {}", e)))?;

        embeddings
            .pop()
            .ok_or_else(|| IndexError::embedding("Model returned no embedding"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}
