//! Embedding module for semantic search
//!
//! Uses fastembed (all-MiniLM-L6-v2, 384d) behind the [`EmbeddingEncoder`] trait so the
//! index can be driven by any deterministic text encoder.

mod discovery;
mod encoder;
mod engine;
mod minilm;

pub use discovery::find_model_cache_dir;
pub use encoder::EmbeddingEncoder;
pub use engine::VectorEngine;
pub use minilm::FastEmbedEncoder;
