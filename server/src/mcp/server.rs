//! MCP Server Implementation
//!
//! Handles MCP protocol requests and routes tool calls to the transcript index.

use super::protocol::*;
use super::resources::{get_all_resources, read_resource};
use super::tools::get_all_tools;
use super::transport::{Incoming, LineTransport, StdioTransport};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult, ToolError};
use crate::youtube::{http_client, WatchPageCaptions, YouTubeDataApi};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tubeindex_core::{
    validate_id, BulkSource, ChannelDirectory, CommentSource, DiscoveryRequest, ErrorKind,
    IngestionPipeline, SearchConfig, SearchOutcome, SemanticIndex, TranscriptResolver,
    TranscriptSearch, VectorEngine, VideoAnalytics, VideoDiscovery, VideoMetadataSource,
};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "tubeindex";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The upstream services behind the read-only tools
#[derive(Clone)]
pub struct Collaborators {
    pub metadata: Arc<dyn VideoMetadataSource>,
    pub discovery: Arc<dyn VideoDiscovery>,
    pub channels: Arc<dyn ChannelDirectory>,
    pub comments: Arc<dyn CommentSource>,
}

impl Collaborators {
    /// One service answering every boundary
    pub fn shared<S>(service: Arc<S>) -> Self
    where
        S: VideoMetadataSource + VideoDiscovery + ChannelDirectory + CommentSource + 'static,
    {
        Self {
            metadata: Arc::clone(&service) as Arc<dyn VideoMetadataSource>,
            discovery: Arc::clone(&service) as Arc<dyn VideoDiscovery>,
            channels: Arc::clone(&service) as Arc<dyn ChannelDirectory>,
            comments: service,
        }
    }
}

/// MCP Backend - the index, the pipeline feeding it and the collaborators
pub struct McpBackend {
    pub pipeline: Arc<IngestionPipeline>,
    pub search: TranscriptSearch,
    pub analytics: VideoAnalytics,
    pub sources: Collaborators,
    pub default_channel: String,
}

impl McpBackend {
    pub fn new(
        index: Arc<SemanticIndex>,
        resolver: Arc<TranscriptResolver>,
        sources: Collaborators,
        default_channel: impl Into<String>,
    ) -> Self {
        Self {
            search: TranscriptSearch::new(Arc::clone(&index)),
            pipeline: Arc::new(IngestionPipeline::new(
                index,
                resolver,
                Arc::clone(&sources.metadata),
                Arc::clone(&sources.discovery),
            )),
            analytics: VideoAnalytics::new(
                Arc::clone(&sources.metadata),
                Arc::clone(&sources.discovery),
            ),
            sources,
            default_channel: default_channel.into(),
        }
    }

    /// Load the embedding model and wire the YouTube collaborators
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let api_key = config.api_key()?;

        let engine = VectorEngine::fastembed(config.models_dir.as_deref())?;
        let index = Arc::new(SemanticIndex::new(Arc::new(engine)));

        let client = http_client(config.http_timeout())?;
        let captions = WatchPageCaptions::new(client.clone())
            .map_err(|e| ServerError::config(format!("caption parser: {}", e)))?;
        let resolver = Arc::new(TranscriptResolver::with_default_language(
            Arc::new(captions),
            &config.caption_language,
        ));
        let api = Arc::new(YouTubeDataApi::new(client, api_key));

        Ok(Self::new(
            index,
            resolver,
            Collaborators::shared(api),
            config.default_channel.clone(),
        ))
    }

    pub fn index(&self) -> &Arc<SemanticIndex> {
        self.pipeline.index()
    }

    fn channel_or_default<'a>(&'a self, channel_id: Option<&'a str>) -> &'a str {
        channel_id.unwrap_or(&self.default_channel)
    }
}

/// MCP Server - handles protocol messages
pub struct McpServer {
    backend: McpBackend,
    initialized: bool,
}

impl McpServer {
    pub fn new(backend: McpBackend) -> Self {
        Self {
            backend,
            initialized: false,
        }
    }

    pub fn backend(&self) -> &McpBackend {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server event loop on stdio
    pub async fn run(&mut self) -> io::Result<()> {
        tracing::info!("MCP server starting...");
        self.serve(StdioTransport::stdio()).await?;
        Ok(())
    }

    /// Serve requests until the peer closes its end. Notifications get no response.
    pub async fn serve<R, W>(
        &mut self,
        mut transport: LineTransport<R, W>,
    ) -> io::Result<LineTransport<R, W>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            match transport.read().await? {
                Incoming::Request(request) => {
                    let notification = request.is_notification();
                    let response = self.handle_request(request).await;
                    if !notification {
                        transport.write_response(&response).await?;
                    }
                }
                Incoming::Malformed(message) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", message)),
                    );
                    transport.write_response(&response).await?;
                }
                Incoming::Eof => {
                    tracing::info!("Client disconnected");
                    break;
                }
            }
        }
        Ok(transport)
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {}", request.method);

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            );
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "initialized" | "notifications/initialized" => {
                JsonRpcResponse::success(request.id, Value::Null)
            }
            "ping" => JsonRpcResponse::from_serializable(request.id, &PingResult {}),
            "tools/list" => JsonRpcResponse::from_serializable(
                request.id,
                &ToolsListResult {
                    tools: get_all_tools(),
                },
            ),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "resources/list" => JsonRpcResponse::from_serializable(
                request.id,
                &ResourcesListResult {
                    resources: get_all_resources(),
                },
            ),
            "resources/read" => self.handle_resources_read(request.id, request.params),
            "notifications/cancelled" => {
                tracing::debug!("Cancellation ignored; requests run to completion");
                JsonRpcResponse::success(request.id, Value::Null)
            }
            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(
                "Client connected: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: params
                .protocol_version
                .unwrap_or_else(|| PROTOCOL_VERSION.to_string()),
            capabilities: ServerCapabilities {
                resources: Some(ListCapability {
                    list_changed: Some(false),
                }),
                tools: Some(ListCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(SERVER_VERSION.to_string()),
            },
            instructions: Some(
                "Index YouTube transcripts with fetch_and_index_transcript or bulk_index_channel_videos, then query them with semantic_search."
                    .to_string(),
            ),
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        match self.execute_tool(&params.name, params.arguments).await {
            Ok(result) => {
                JsonRpcResponse::from_serializable(id, &ToolCallResult::json(&result, false))
            }
            Err(e) if e.is_fatal() => {
                tracing::error!("Tool {} hit an index invariant violation: {}", params.name, e);
                JsonRpcResponse::error(id, JsonRpcError::from(&e))
            }
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", params.name, e);
                JsonRpcResponse::from_serializable(id, &ToolCallResult::json(&e.to_value(), true))
            }
        }
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ResourceReadParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        match read_resource(&params.uri, self.backend.index()) {
            Some(result) => JsonRpcResponse::from_serializable(id, &result),
            None => JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Resource not found: {}", params.uri)),
            ),
        }
    }

    /// Execute a tool by name
    async fn execute_tool(&self, name: &str, args: Option<Value>) -> Result<Value, ToolError> {
        let args = ToolArgs::new(args)?;
        let backend = &self.backend;

        match name {
            "index_video" => {
                let title = args.required_str("title")?;
                let transcript = args.required_str("transcript")?;
                let video_id = args.str("video_id")?;

                let id = backend.pipeline.index_video(title, transcript, video_id)?;
                Ok(serde_json::json!({
                    "status": "indexed",
                    "id": id,
                    "title": title,
                }))
            }

            "semantic_search" => {
                let query = args.required_str("query")?;
                let config = SearchConfig {
                    top_k: args.usize("top_k", 3)?,
                    include_full_text: args.bool("include_full_text", false)?,
                };

                match backend.search.search(query, &config)? {
                    SearchOutcome::NotIndexedYet => Err(ToolError::index_not_ready()),
                    SearchOutcome::Hits(hits) => Ok(serde_json::json!({
                        "query": query,
                        "total": hits.len(),
                        "results": to_json(&hits)?,
                    })),
                }
            }

            "fetch_and_index_transcript" => {
                let video_id = args.required_str("video_id")?;
                let languages = args.string_list("languages")?;

                let ingested = backend
                    .pipeline
                    .ingest_one(video_id, languages.as_deref())
                    .await?;
                with_status("indexed", &ingested)
            }

            "bulk_index_channel_videos" => {
                let max_videos = args.usize("max_videos", 10)?;
                let source = match args.string_list("video_ids")? {
                    Some(ids) => BulkSource::Videos(ids),
                    None => BulkSource::Channel(
                        backend.channel_or_default(args.str("channel_id")?).to_string(),
                    ),
                };

                let report = backend.pipeline.ingest_bulk(&source, max_videos).await?;
                with_status("completed", &report)
            }

            "check_transcript_availability" => {
                let video_id = args.required_str("video_id")?;
                validate_id("video_id", video_id)?;

                let availability = backend.pipeline.resolver().check_availability(video_id).await;
                to_json(&availability)
            }

            "find_videos_with_transcripts" => {
                let max_results = args.usize("max_results", 20)?;
                let request = match args.str("query")?.filter(|q| !q.trim().is_empty()) {
                    Some(query) => DiscoveryRequest::Query(query.to_string()),
                    None => DiscoveryRequest::Channel(
                        backend.channel_or_default(args.str("channel_id")?).to_string(),
                    ),
                };

                let scan = backend
                    .pipeline
                    .find_with_transcripts(&request, max_results)
                    .await?;
                to_json(&scan)
            }

            "get_video_transcript" => {
                let video_id = args.required_str("video_id")?;
                validate_id("video_id", video_id)?;
                let languages = args.string_list("languages")?;

                let transcript = backend
                    .pipeline
                    .resolver()
                    .resolve(video_id, languages.as_deref())
                    .await?;
                Ok(serde_json::json!({
                    "video_id": transcript.video_id,
                    "language": transcript.track.language,
                    "language_code": transcript.track.language_code,
                    "is_generated": transcript.track.is_generated,
                    "length": transcript.len(),
                    "segments": transcript.segments,
                    "transcript": transcript.text,
                }))
            }

            "search_youtube" => {
                let query = args.required_str("query")?;
                let max_results = args.usize("max_results", 5)?;
                if max_results == 0 {
                    return Ok(Value::Array(Vec::new()));
                }

                let videos = backend
                    .sources
                    .discovery
                    .discover(&DiscoveryRequest::Query(query.to_string()), max_results)
                    .await?;
                to_json(&videos)
            }

            "get_latest_videos_from_channel" => {
                let channel_id = backend.channel_or_default(args.str("channel_id")?);
                validate_id("channel_id", channel_id)?;
                let max_results = args.usize("max_results", 5)?;
                if max_results == 0 {
                    return Ok(Value::Array(Vec::new()));
                }

                let videos = backend
                    .sources
                    .discovery
                    .discover(&DiscoveryRequest::Channel(channel_id.to_string()), max_results)
                    .await?;
                to_json(&videos)
            }

            "get_video_details" => {
                let video_id = args.required_str("video_id")?;
                validate_id("video_id", video_id)?;

                let details = backend.sources.metadata.video_details(video_id).await?;
                to_json(&details)
            }

            "get_video_stats" => {
                let video_id = args.required_str("video_id")?;
                let stats = backend.analytics.stats(video_id).await?;
                to_json(&stats)
            }

            "compare_video_stats" => {
                let video_ids = args
                    .string_list("video_ids")?
                    .filter(|ids| !ids.is_empty())
                    .ok_or_else(|| ToolError::invalid_input("Missing 'video_ids' parameter"))?;

                let rows = backend.analytics.compare(&video_ids).await;
                to_json(&rows)
            }

            "search_and_analyze_videos" => {
                let query = args.required_str("query")?;
                let max_results = args.usize("max_results", 10)?;

                let analysis = backend
                    .analytics
                    .search_and_analyze(query, max_results)
                    .await?;
                to_json(&analysis)
            }

            "get_channel_stats" => {
                let channel_id = backend.channel_or_default(args.str("channel_id")?);
                validate_id("channel_id", channel_id)?;

                let stats = backend.sources.channels.channel_stats(channel_id).await?;
                to_json(&stats)
            }

            "get_channel_id_by_username" => {
                let username = args.required_str("username")?;
                let channel = backend.sources.channels.find_channel(username.trim()).await?;
                to_json(&channel)
            }

            "get_video_comments" => {
                let video_id = args.required_str("video_id")?;
                validate_id("video_id", video_id)?;
                let max_results = args.usize("max_results", 50)?;

                let comments = backend
                    .sources
                    .comments
                    .top_comments(video_id, max_results)
                    .await?;
                to_json(&comments)
            }

            _ => Err(ToolError::not_found(format!("Unknown tool: {}", name))),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(serialization_error)
}

/// Reported as a tool error; the index is untouched
fn serialization_error(e: serde_json::Error) -> ToolError {
    ToolError::new(
        ErrorKind::UpstreamServiceError,
        format!("Failed to serialize tool result: {}", e),
    )
}

/// Serialize `payload` and add a top-level `status`
fn with_status<T: Serialize>(status: &str, payload: &T) -> Result<Value, ToolError> {
    let mut value = to_json(payload)?;
    if let Value::Object(map) = &mut value {
        map.insert("status".to_string(), Value::String(status.to_string()));
    }
    Ok(value)
}

/// Tool arguments; snake_case keys, camelCase accepted as an alias
struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    fn new(args: Option<Value>) -> Result<Self, ToolError> {
        match args {
            None | Some(Value::Null) => Ok(Self(Map::new())),
            Some(Value::Object(map)) => Ok(Self(map)),
            Some(_) => Err(ToolError::invalid_input("Tool arguments must be an object")),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .get(key)
            .or_else(|| self.0.get(&camel_case(key)))
            .filter(|v| !v.is_null())
    }

    fn str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ToolError::invalid_input(format!(
                "'{}' must be a string",
                key
            ))),
        }
    }

    fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        self.str(key)?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ToolError::invalid_input(format!("Missing '{}' parameter", key)))
    }

    fn usize(&self, key: &str, default: usize) -> Result<usize, ToolError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    ToolError::invalid_input(format!("'{}' must be a non-negative integer", key))
                }),
        }
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ToolError::invalid_input(format!(
                "'{}' must be a boolean",
                key
            ))),
        }
    }

    /// A list of strings; a single string is taken as a one-element list
    fn string_list(&self, key: &str) -> Result<Option<Vec<String>>, ToolError> {
        let invalid = || ToolError::invalid_input(format!("'{}' must be a list of strings", key));
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(invalid()),
        }
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
