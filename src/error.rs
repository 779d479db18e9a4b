//! Error types for meta-time-changer

use crate::config::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for meta-time-changer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for meta-time-changer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Input directory not found: {path}")]
    InputDirMissing { path: PathBuf },

    #[error("{tool} failed on {path}: {message}")]
    Tool {
        tool: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("{tool} timed out after {}s", timeout.as_secs())]
    ToolTimeout { tool: &'static str, timeout: Duration },

    #[error("{tool} is not available")]
    ToolUnavailable { tool: &'static str },

    #[error("Failed to set file times on {path}: {message}")]
    Timestamp { path: PathBuf, message: String },

    #[error("Refusing to copy {path} onto itself")]
    SameFile { path: PathBuf },

    #[error("Interrupted by operator")]
    Interrupted,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
