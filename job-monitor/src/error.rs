//! Error types for the job monitor.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors that can occur while loading, polling or controlling a job.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Status file does not exist (yet)
    #[error("Status file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// Status file exists but holds no document
    #[error("Status file is empty: {}", .0.display())]
    SourceEmpty(PathBuf),

    /// Control request could not be delivered
    #[error("Control error: {0}")]
    Control(String),

    /// Poller thread went away
    #[error("Snapshot poller disconnected")]
    PollerDisconnected,
}

impl MonitorError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a control error
    pub fn control(msg: impl Into<String>) -> Self {
        Self::Control(msg.into())
    }
}
