//! TubeIndex MCP Server Entry Point
//!
//! Serves the transcript index over the Model Context Protocol on stdio.
//! Logs go to stderr so stdout carries protocol traffic only.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubeindex_mcp::error::ServerResult;
use tubeindex_mcp::heartbeat::spawn_heartbeat;
use tubeindex_mcp::mcp::{McpBackend, McpServer};
use tubeindex_mcp::ServerConfig;

#[derive(Parser)]
#[command(name = "tubeindex-mcp")]
#[command(about = "Semantic search over YouTube transcripts, as an MCP server")]
#[command(version)]
struct Args {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubeindex_mcp=debug,tubeindex_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args.config).await {
        tracing::error!("MCP server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> ServerResult<()> {
    config.validate()?;

    tracing::info!("Starting TubeIndex MCP server");
    tracing::info!("Default channel: {}", config.default_channel);

    let backend = McpBackend::from_config(&config)?;
    tracing::info!(
        "Embedding model {} ready ({} dimensions)",
        backend.index().engine().model_name(),
        backend.index().engine().dimension()
    );

    let heartbeat = spawn_heartbeat(config.heartbeat_interval());

    let mut server = McpServer::new(backend);
    let result = server.run().await;

    heartbeat.abort();
    result?;
    tracing::info!("MCP server stopped");
    Ok(())
}
