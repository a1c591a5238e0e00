//! Tracing setup for the monitor binary.
//!
//! The TUI owns stdout and stderr is hidden behind the alternate screen, so
//! log output goes to a file or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{MonitorError, MonitorResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`.
pub fn init_logging(log_file: Option<&Path>, default_directive: &str) -> MonitorResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .try_init(),
    };

    result.map_err(|e| MonitorError::invalid_config(format!("logging: {e}")))
}
