//! Panel composites.
//!
//! Each panel binds one slice of a [`MetricsSnapshot`](crate::MetricsSnapshot)
//! to primitive renderers and owns the color policy for that slice.

mod checkpoint;
mod gpu;
mod header;
mod logs;
mod metrics;
mod performance;
mod progress;

pub use checkpoint::TerminalCheckpoint;
pub use gpu::{memory_variant, temperature_variant, utilization_variant, TerminalGpu};
pub use header::{header_buttons, status_variant, TerminalHeader};
pub use logs::TerminalLogs;
pub use metrics::TerminalMetrics;
pub use performance::TerminalPerformance;
pub use progress::{ProgressFigures, TerminalProgress};

use ratatui::layout::Rect;

use crate::config::MonitorConfig;
use crate::format::BorderStyle;
use crate::widgets::AsciiBox;

/// How panels are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFrame {
    pub framed: bool,
    pub border: BorderStyle,
}

impl Default for PanelFrame {
    fn default() -> Self {
        Self {
            framed: true,
            border: BorderStyle::Single,
        }
    }
}

impl PanelFrame {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            framed: config.framed_panels,
            border: if config.double_borders {
                BorderStyle::Double
            } else {
                BorderStyle::Single
            },
        }
    }

    /// Box sized to `area` when framed, unframed otherwise.
    pub fn boxed<'a>(&self, title: impl Into<String>, area: Rect) -> AsciiBox<'a> {
        AsciiBox::new(title)
            .width(self.framed.then_some(area.width))
            .border(self.border)
    }

    /// Width available to content inside a panel of `width` cells.
    pub fn content_width(&self, width: u16) -> u16 {
        if self.framed {
            width.saturating_sub(4)
        } else {
            width.saturating_sub(2)
        }
    }
}
