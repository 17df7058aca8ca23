//! Error types for the TubeIndex MCP server.

use serde::Serialize;
use thiserror::Error;
use tubeindex_core::{
    ErrorKind, IndexError, IngestError, SourceError, TranscriptError, UnavailableReason,
};

use crate::mcp::protocol::JsonRpcError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Structured failure returned to tool callers.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            reason: None,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputValidation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn index_not_ready() -> Self {
        Self::new(
            ErrorKind::IndexNotReady,
            "No transcripts indexed yet. Use fetch_and_index_transcript or bulk_index_channel_videos first.",
        )
    }

    /// Invariant violations escape the tool result and become JSON-RPC errors
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "error": self })
    }
}

impl From<IngestError> for ToolError {
    fn from(err: IngestError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl From<TranscriptError> for ToolError {
    fn from(err: TranscriptError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl From<IndexError> for ToolError {
    fn from(err: IndexError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<SourceError> for ToolError {
    fn from(err: SourceError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<&ToolError> for JsonRpcError {
    fn from(err: &ToolError) -> Self {
        let mut rpc = JsonRpcError::internal_error(err.message.clone());
        rpc.data = serde_json::to_value(err).ok();
        rpc
    }
}
