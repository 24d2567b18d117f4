//! Error types for skulk.
//!
//! Uses `thiserror` for ergonomic error definitions. Connection-level errors
//! stay inside the banner grab state machine; only [`ConfigError`] ever
//! reaches the user.

use crate::types::RangeError;
use std::path::PathBuf;
use thiserror::Error;

/// Per-attempt connection failure.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("connection to {target}:{port} failed: {reason}")]
    ConnectionFailed {
        target: String,
        port: u16,
        reason: String,
    },

    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("host unreachable")]
    HostUnreachable,
}

/// Terminal, user-visible errors. Any of these stops the run before scanning.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    #[error("No targets provided!")]
    NoTargets,

    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid seed for port {0}: port must be 1-65535")]
    InvalidSeedPort(u16),
}

/// Result type alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;
