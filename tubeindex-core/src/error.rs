//! Error types for tubeindex-core

use serde::Serialize;
use thiserror::Error;

/// Coarse classification shared by every error surfaced to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input (ids, arguments)
    InputValidation,
    /// Video or channel absent upstream
    NotFound,
    /// No usable caption track (see [`UnavailableReason`])
    TranscriptUnavailable,
    /// Collaborator network/auth/quota failure
    UpstreamServiceError,
    /// Search issued before anything was indexed
    IndexNotReady,
    /// Vector index and metadata store disagree. Always a bug.
    InternalInvariantViolation,
}

impl ErrorKind {
    /// Only invariant violations are fatal; everything else is reported as a structured result.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::InternalInvariantViolation)
    }
}

/// Sub-kind of [`ErrorKind::TranscriptUnavailable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    Disabled,
    NoneFound,
    VideoUnavailable,
}

/// Errors raised by the encoder and the in-memory index
#[derive(Debug, Error)]
pub enum IndexError {
    /// Model loading error
    #[error("Model error: {0}")]
    Model(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector length does not match the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Record id past the end of the store
    #[error("Record {id} out of range (store holds {len})")]
    OutOfRange { id: u64, len: usize },

    /// Vector index and metadata store are no longer aligned
    #[error("Index invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl IndexError {
    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create an invariant violation
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. } => ErrorKind::NotFound,
            Self::InvariantViolation(_) => ErrorKind::InternalInvariantViolation,
            Self::DimensionMismatch { .. } => ErrorKind::InputValidation,
            Self::Model(_) | Self::Embedding(_) | Self::InvalidPath(_) => {
                ErrorKind::UpstreamServiceError
            }
        }
    }
}

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = IndexError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 3");
    }

    #[test]
    fn test_only_invariant_violation_is_fatal() {
        assert!(IndexError::invariant("len 3 != 2").kind().is_fatal());
        assert!(!IndexError::OutOfRange { id: 9, len: 2 }.kind().is_fatal());
        assert!(!ErrorKind::IndexNotReady.is_fatal());
    }

    #[test]
    fn test_model_failures_are_upstream_errors() {
        for err in [
            IndexError::model("load failed"),
            IndexError::embedding("no vector"),
            IndexError::invalid_path("/nope"),
        ] {
            assert_eq!(err.kind(), ErrorKind::UpstreamServiceError);
        }
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TranscriptUnavailable).unwrap();
        assert_eq!(json, "\"transcript_unavailable\"");
        let json = serde_json::to_string(&UnavailableReason::VideoUnavailable).unwrap();
        assert_eq!(json, "\"video_unavailable\"");
    }
}
