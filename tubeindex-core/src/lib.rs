//! TubeIndex core
//!
//! In-memory semantic index over video transcripts, with the ingestion pipeline that feeds it.
//!
//! ## Features
//!
//! - **Exact search** - flat squared-L2 scan, ties broken by insertion order
//! - **Aligned stores** - vectors and metadata appended as one unit behind a single lock
//! - **Tiered transcript resolution** - manual, then generated, then any caption track
//! - **Partial-failure bulk ingestion** - one outcome per candidate, in discovery order
//!
//! ## Example
//!
//! ```ignore
//! use tubeindex_core::{NewRecord, SearchConfig, SemanticIndex, TranscriptSearch, VectorEngine};
//!
//! let engine = Arc::new(VectorEngine::fastembed(None)?);
//! let index = Arc::new(SemanticIndex::new(engine));
//! index.index_text(NewRecord::new("Intro to Rust", "ownership and borrowing ..."))?;
//!
//! let search = TranscriptSearch::new(index);
//! let outcome = search.search("memory safety", &SearchConfig::default())?;
//! ```

pub mod analytics;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod record;
pub mod search;
pub mod source;
pub mod storage;
pub mod transcript;
pub mod vector;

// Re-exports for convenience
pub use analytics::{Comparison, SearchAnalysis, VideoAnalytics, VideoStats};
pub use embedding::{EmbeddingEncoder, VectorEngine};
pub use error::{ErrorKind, IndexError, UnavailableReason};
pub use ingest::{
    validate_id, BulkIngestionReport, BulkSource, IngestError, IngestedVideo, IngestionPipeline,
    IngestionResult, IngestionStatus, TranscriptScan, VideoWithTranscripts,
};
pub use record::{IndexedRecord, MetadataStore, NewRecord};
pub use search::{similarity, SearchConfig, SearchHit, SearchOutcome, TranscriptSearch};
pub use source::{
    watch_url, CaptionSource, ChannelDirectory, ChannelRef, ChannelStats, CommentSource,
    DiscoveryRequest, SourceError, TranscriptCandidate, TranscriptSegment, VideoComment,
    VideoDetails, VideoDiscovery, VideoMetadataSource, VideoSummary,
};
pub use storage::{IndexStats, RecordSummary, SemanticIndex};
pub use transcript::{
    Availability, ResolutionStrategy, Transcript, TranscriptError, TranscriptResolver,
};
pub use vector::{Neighbor, RecordId, VectorIndex};
