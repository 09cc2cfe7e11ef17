//! Client configuration loading
//!
//! Reads `~/.config/lurkmode/config.toml`. Every field is optional; a missing
//! or unreadable file falls back to defaults.

use std::path::Path;
use std::time::Duration;

use lurkmode_utils::{LurkError, Result};

use crate::cli::Args;
use crate::connection::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_DISCONNECT_BACKOFF, DEFAULT_SERVER};
use crate::dispatch::{StallPolicy, DEFAULT_DISPATCH_CAPACITY, DEFAULT_ENQUEUE_TIMEOUT};
use crate::history::DEFAULT_HISTORY_SIZE;

/// Client settings
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Messages kept in the chat view; values below 1 mean 1
    pub history_size: i64,
    /// Messages buffered between ingest and UI
    pub dispatch_capacity: usize,
    pub enqueue_timeout_ms: u64,
    pub disconnect_backoff_ms: u64,
    pub connect_timeout_ms: u64,
    pub show_timestamps: bool,
    /// Chat server as `host:port`
    pub server: String,
    pub stall_policy: StallPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE as i64,
            dispatch_capacity: DEFAULT_DISPATCH_CAPACITY,
            enqueue_timeout_ms: DEFAULT_ENQUEUE_TIMEOUT.as_millis() as u64,
            disconnect_backoff_ms: DEFAULT_DISCONNECT_BACKOFF.as_millis() as u64,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            show_timestamps: false,
            server: DEFAULT_SERVER.to_string(),
            stall_policy: StallPolicy::Abort,
        }
    }
}

impl ClientConfig {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn disconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.disconnect_backoff_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Command-line flags win over the file
    pub fn apply_args(&mut self, args: &Args) {
        if args.timestamps {
            self.show_timestamps = true;
        }
        if let Some(size) = args.history_size {
            self.history_size = size;
        }
        if let Some(server) = &args.server {
            self.server = server.clone();
        }
    }
}

/// Load config from the default location
pub fn load_config() -> ClientConfig {
    load_config_from(&lurkmode_utils::config_file())
}

/// Load config from a path
///
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load_config_from(path: &Path) -> ClientConfig {
    if !path.exists() {
        tracing::debug!("Config file not found, using defaults");
        return ClientConfig::default();
    }

    match read_config(path) {
        Ok(config) => {
            tracing::debug!(
                "Loaded config from {}: history_size={}, server={}",
                path.display(),
                config.history_size,
                config.server
            );
            config
        }
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            ClientConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| LurkError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| LurkError::ConfigInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
