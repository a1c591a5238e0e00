use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::format::format_compact;
use crate::snapshot::MetricsSnapshot;
use crate::theme::colors;
use crate::widgets::{MetricDisplay, Variant};

/// Throughput readouts. Each row appears only when the producer reported it.
pub struct TerminalPerformance<'a> {
    snapshot: &'a MetricsSnapshot,
    frame: PanelFrame,
}

impl<'a> TerminalPerformance<'a> {
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

    pub fn lines(&self) -> Vec<Line<'static>> {
        let s = self.snapshot;
        let mut lines = Vec::with_capacity(3);

        if let Some(samples) = s.samples_per_second {
            lines.push(
                MetricDisplay::new("Samples/s", format!("{:.2}", samples))
                    .variant(Variant::Info)
                    .line(),
            );
        }
        if let Some(tokens) = s.tokens_per_second {
            lines.push(
                MetricDisplay::new("Tokens/s", format_compact(tokens))
                    .variant(Variant::Info)
                    .line(),
            );
        }
        if let Some(step_time) = s.avg_step_time {
            lines.push(
                MetricDisplay::new("Step Time", format!("{:.3}s", step_time))
                    .variant(Variant::Info)
                    .line(),
            );
        }

        if lines.is_empty() {
            lines.push(Line::styled(
                "No performance data",
                Style::default().fg(colors::MUTED),
            ));
        }
        lines
    }
}

impl Widget for TerminalPerformance<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        self.frame
            .boxed("PERFORMANCE", area)
            .content(lines)
            .render(area, buf);
    }
}
