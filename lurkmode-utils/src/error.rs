//! Error types for lurkmode
//!
//! Provides a unified error type used across all lurkmode crates.

use std::path::PathBuf;

/// Main error type for lurkmode operations
#[derive(Debug, thiserror::Error)]
pub enum LurkError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Connection Errors ===

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection timeout after {millis}ms")]
    ConnectionTimeout { millis: u64 },

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    #[error("Session is not connected")]
    NotConnected,

    #[error("Session already connected")]
    AlreadyConnected,

    // === Protocol Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Pipeline Errors ===

    #[error("Message channel is full for {millis}ms, the UI appears to be stalled")]
    DispatchStalled { millis: u64 },

    #[error("Message channel closed, the UI is no longer receiving")]
    DispatchClosed,

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LurkError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error is retryable
    ///
    /// Only a rejected disconnect request and connect timeouts qualify; the
    /// ingest session itself is never reconnected.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotConnected | Self::ConnectionTimeout { .. })
    }
}

/// Result type alias using LurkError
pub type Result<T> = std::result::Result<T, LurkError>;
