//! Monitor configuration.
//!
//! Values come from [`MonitorConfig::default`], optionally overlaid by a JSON
//! file, and finally by command-line flags in the binary.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, MonitorResult};

/// Job monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between snapshot fetches in milliseconds
    pub refresh_ms: u64,
    /// Number of log entries shown in the log stream
    pub max_log_lines: usize,
    /// Number of log entries kept from each snapshot
    pub log_buffer_limit: usize,
    /// Number of points kept per time series
    pub history_limit: usize,
    /// Sparkline height in rows
    pub sparkline_height: u16,
    /// Decimal places used for trend deltas
    pub trend_decimals: usize,
    /// Frame panels with box-drawing borders
    pub framed_panels: bool,
    /// Use double-line borders instead of single-line
    pub double_borders: bool,
    /// Inject a warning when a running job has not reported for this long
    pub stale_after_secs: Option<u64>,
    /// Render the shortcut legend in its compact form
    pub compact_shortcuts: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 1000,
            max_log_lines: 50,
            log_buffer_limit: 500,
            history_limit: 500,
            sparkline_height: 5,
            trend_decimals: 4,
            framed_panels: true,
            double_borders: false,
            stale_after_secs: Some(300),
            compact_shortcuts: false,
        }
    }
}

impl MonitorConfig {
    /// Load a configuration file, falling back to defaults for missing keys.
    pub fn load(path: &Path) -> MonitorResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer or poller cannot work with.
    pub fn validate(&self) -> MonitorResult<()> {
        if self.refresh_ms == 0 {
            return Err(MonitorError::invalid_config("refresh_ms must be > 0"));
        }
        if self.max_log_lines == 0 {
            return Err(MonitorError::invalid_config("max_log_lines must be > 0"));
        }
        if self.log_buffer_limit < self.max_log_lines {
            return Err(MonitorError::invalid_config(format!(
                "log_buffer_limit ({}) must be >= max_log_lines ({})",
                self.log_buffer_limit, self.max_log_lines
            )));
        }
        if self.history_limit == 0 {
            return Err(MonitorError::invalid_config("history_limit must be > 0"));
        }
        if self.sparkline_height < 2 {
            return Err(MonitorError::invalid_config(
                "sparkline_height must be at least 2",
            ));
        }
        if self.trend_decimals > 10 {
            return Err(MonitorError::invalid_config(
                "trend_decimals must be <= 10",
            ));
        }
        Ok(())
    }
}
