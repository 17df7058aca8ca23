//! Server configuration
//!
//! Every option can be given on the command line or through the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

/// Channel used by channel tools when the caller gives none
pub const DEFAULT_CHANNEL_ID: &str = "UCX6OQ3DkcsbYNE6H8uQQuVA";

#[derive(Debug, Clone, clap::Args)]
pub struct ServerConfig {
    /// YouTube Data API v3 key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Channel used when a channel tool is called without one
    #[arg(long, env = "TUBEINDEX_DEFAULT_CHANNEL", default_value = DEFAULT_CHANNEL_ID)]
    pub default_channel: String,

    /// Language of the default manual -> generated -> any caption chain
    #[arg(long, env = "TUBEINDEX_CAPTION_LANGUAGE", default_value = "en")]
    pub caption_language: String,

    /// Embedding model cache directory (default: ~/.tubeindex/models)
    #[arg(long, env = "TUBEINDEX_MODELS_PATH")]
    pub models_dir: Option<PathBuf>,

    /// Seconds between liveness log lines
    #[arg(long, default_value_t = 30)]
    pub heartbeat_secs: u64,

    /// Timeout for each upstream HTTP request, in seconds
    #[arg(long, default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            default_channel: DEFAULT_CHANNEL_ID.to_string(),
            caption_language: "en".to_string(),
            models_dir: None,
            heartbeat_secs: 30,
            http_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// The API key, or a configuration error when it is missing
    pub fn api_key(&self) -> ServerResult<&str> {
        self.youtube_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ServerError::config("YOUTUBE_API_KEY is not set"))
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> ServerResult<()> {
        self.api_key()?;
        tubeindex_core::validate_id("default channel", &self.default_channel)
            .map_err(|e| ServerError::config(e.to_string()))?;
        if self.caption_language.trim().is_empty() {
            return Err(ServerError::config("caption language must not be empty"));
        }
        if self.heartbeat_secs == 0 {
            return Err(ServerError::config("heartbeat interval must be positive"));
        }
        if self.http_timeout_secs == 0 {
            return Err(ServerError::config("HTTP timeout must be positive"));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: ServerConfig,
    }

    fn parse(args: &[&str]) -> ServerConfig {
        Cli::try_parse_from(std::iter::once("tubeindex-mcp").chain(args.iter().copied()))
            .unwrap()
            .config
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--youtube-api-key",
            "key-123",
            "--default-channel",
            "UCabc",
            "--caption-language",
            "de",
            "--heartbeat-secs",
            "5",
        ]);
        assert_eq!(config.api_key().unwrap(), "key-123");
        assert_eq!(config.default_channel, "UCabc");
        assert_eq!(config.caption_language, "de");
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = ServerConfig::default();
        match config.validate() {
            Err(ServerError::Config(msg)) => assert!(msg.contains("YOUTUBE_API_KEY")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        let blank = ServerConfig {
            youtube_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.api_key().is_err());
    }

    #[test]
    fn test_rejects_bad_settings() {
        let base = ServerConfig {
            youtube_api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(base.validate().is_ok());

        let bad_channel = ServerConfig {
            default_channel: "not a channel".to_string(),
            ..base.clone()
        };
        assert!(bad_channel.validate().is_err());

        let no_heartbeat = ServerConfig {
            heartbeat_secs: 0,
            ..base
        };
        assert!(no_heartbeat.validate().is_err());
    }
}
