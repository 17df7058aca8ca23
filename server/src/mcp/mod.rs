//! MCP (Model Context Protocol) Server Module
//!
//! Exposes the transcript index to AI clients as MCP tools and resources.
//!
//! ## Usage
//!
//! ```bash
//! YOUTUBE_API_KEY=... tubeindex-mcp
//! ```
//!
//! The server speaks newline-delimited JSON-RPC 2.0 on stdio; logs go to stderr.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::{Collaborators, McpBackend, McpServer};
