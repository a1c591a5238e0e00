//! Terminal monitor for fine-tuning jobs.
//!
//! This crate provides:
//! - Fixed-width formatting and ASCII primitives (progress bars, sparklines,
//!   titled boxes, metric readouts, log stream, shortcut legend)
//! - Panels binding a [`MetricsSnapshot`] to those primitives
//! - The monitor root with its loading, error and empty screens
//! - A background poller, job-control sinks and an interactive TUI
//!
//! # Binaries
//!
//! - `job-monitor` - Live TUI for a job status file, or a synthetic demo job

pub mod action;
pub mod app;
pub mod capture;
pub mod config;
pub mod control;
pub mod demo;
pub mod error;
pub mod format;
pub mod keys;
pub mod logging;
pub mod monitor;
pub mod panels;
pub mod poller;
pub mod snapshot;
pub mod source;
pub mod theme;
pub mod widgets;

pub use action::{AvailableActions, MonitorAction};
pub use app::{App, SourceFactory};
pub use capture::{buffer_to_ansi, buffer_to_plain, capture_monitor, render_frame, CaptureFormat};
pub use config::MonitorConfig;
pub use control::{control_callbacks, ControlAction, ControlRequest, ControlSink, FileControlSink};
pub use demo::DemoSource;
pub use error::{MonitorError, MonitorResult};
pub use logging::init_logging;
pub use monitor::{
    build_shortcuts, ActionCallback, MonitorCallbacks, MonitorProps, MonitorState, MonitorView,
    TerminalMonitor,
};
pub use poller::{PollEvent, PollSettings, Poller};
pub use snapshot::{
    ChartDataPoint, CheckpointSummary, GpuStatus, JobStatus, LogEntry, LogLevel, MetricsSnapshot,
};
pub use source::{FileSource, SnapshotSource};
