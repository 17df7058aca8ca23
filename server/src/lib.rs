//! TubeIndex MCP Server Library
//!
//! Exposes the transcript index over the Model Context Protocol, backed by YouTube
//! collaborators for metadata, discovery and captions.

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod mcp;
pub mod youtube;

pub use config::ServerConfig;
pub use error::{ServerError, ToolError};
