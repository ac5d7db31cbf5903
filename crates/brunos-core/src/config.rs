//! Configuration management for the order board.
//!
//! Values come from an optional `brunos.toml`; command-line flags and
//! environment variables are applied on top by the binary.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, OrderResult};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and WebSocket listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Order persistence
    #[serde(default)]
    pub store: StoreConfig,

    /// Display hub tuning
    #[serde(default)]
    pub hub: HubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the uploaded menu image
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Take display identity from `X-Forwarded-For`. Only safe behind a
    /// proxy that overwrites the header; clients can set it freely.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            trust_forwarded_for: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

/// Store configuration. Without a Redis URL orders live in memory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Upper bound for one push to one session
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,

    /// Pause before the full order dump to a newly seen device
    #[serde(default)]
    pub initial_sync_delay_ms: u64,

    /// Outbound frames buffered per session before sends start waiting
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout(),
            initial_sync_delay_ms: 0,
            session_buffer: default_session_buffer(),
        }
    }
}

fn default_send_timeout() -> u64 {
    2000
}

fn default_session_buffer() -> usize {
    64
}

impl HubConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn initial_sync_delay(&self) -> Duration {
        Duration::from_millis(self.initial_sync_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> OrderResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(raw: &str) -> OrderResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| OrderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OrderResult<()> {
        if self.hub.send_timeout_ms == 0 {
            return Err(OrderError::Config("hub.send_timeout_ms must be positive".to_string()));
        }
        if self.hub.session_buffer == 0 {
            return Err(OrderError::Config("hub.session_buffer must be positive".to_string()));
        }
        Ok(())
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
