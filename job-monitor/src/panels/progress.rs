use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::format::format_duration;
use crate::snapshot::{JobStatus, MetricsSnapshot};
use crate::theme::colors;
use crate::widgets::{AsciiProgressBar, Variant};

/// Cells taken by `[`, `]` and ` 100.0%`.
const BAR_DECORATION: usize = 9;

/// Percentages derived from a snapshot's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressFigures {
    pub epoch_percent: f64,
    pub step_percent: f64,
    /// Same as `epoch_percent`; step progress does not contribute.
    pub overall_percent: f64,
}

impl ProgressFigures {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            epoch_percent: snapshot.epoch_percent(),
            step_percent: snapshot.step_percent(),
            overall_percent: snapshot.overall_percent(),
        }
    }
}

/// Overall, epoch and step bars plus timing.
pub struct TerminalProgress<'a> {
    snapshot: &'a MetricsSnapshot,
    frame: PanelFrame,
}

impl<'a> TerminalProgress<'a> {
    pub fn new(snapshot: &'a MetricsSnapshot) -> Self {
        Self {
            snapshot,
            frame: PanelFrame::default(),
        }
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn figures(&self) -> ProgressFigures {
        ProgressFigures::from_snapshot(self.snapshot)
    }

    fn overall_variant(&self) -> Variant {
        match self.snapshot.status {
            JobStatus::Completed => Variant::Success,
            JobStatus::Failed => Variant::Error,
            JobStatus::Paused => Variant::Warning,
            _ => Variant::Info,
        }
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let s = self.snapshot;
        let figures = self.figures();

        let labels = [
            "Overall".to_string(),
            format!("Epoch {}/{}", s.current_epoch, s.total_epochs()),
            format!("Step {}/{}", s.current_step, s.total_steps()),
        ];
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let bar_width = (width as usize).saturating_sub(label_width + 1 + BAR_DECORATION);

        let bars = [
            (figures.overall_percent, self.overall_variant()),
            (figures.epoch_percent, Variant::Info),
            (figures.step_percent, Variant::Info),
        ];

        let mut lines: Vec<Line<'static>> = labels
            .iter()
            .zip(bars)
            .map(|(label, (percent, variant))| {
                let padded = format!("{:<width$}", label, width = label_width);
                AsciiProgressBar::new(percent)
                    .width(bar_width)
                    .label(&padded)
                    .variant(variant)
                    .line()
            })
            .collect();

        let mut timing = Vec::new();
        if let Some(elapsed) = s.elapsed_seconds {
            timing.push(Span::styled("Elapsed ", Style::default().fg(colors::MUTED)));
            timing.push(Span::raw(format_duration(elapsed)));
        }
        if let Some(eta) = s.eta_seconds {
            if !timing.is_empty() {
                timing.push(Span::raw("  "));
            }
            timing.push(Span::styled("ETA ", Style::default().fg(colors::MUTED)));
            timing.push(Span::raw(format_duration(eta)));
        }
        if !timing.is_empty() {
            lines.push(Line::from(timing));
        }

        lines
    }
}

impl Widget for TerminalProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(self.frame.content_width(area.width));
        self.frame
            .boxed("PROGRESS", area)
            .content(lines)
            .render(area, buf);
    }
}
