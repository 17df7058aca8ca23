//! Text encoder abstraction

use crate::error::Result;

/// Pure function from text to a fixed-dimension vector.
///
/// Implementations must be deterministic for identical input under one model version and
/// must always return vectors of exactly [`dimension`](Self::dimension) components.
pub trait EmbeddingEncoder: Send + Sync {
    /// Encode a single text
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Output dimension D
    fn dimension(&self) -> usize;

    /// Human-readable model identifier
    fn model_name(&self) -> &str;
}
