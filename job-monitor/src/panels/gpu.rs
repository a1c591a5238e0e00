use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::format::format_gb;
use crate::snapshot::GpuStatus;
use crate::theme::colors;
use crate::widgets::{AsciiProgressBar, Variant};

const LABEL_WIDTH: usize = 6;
const BAR_DECORATION: usize = 9;

/// Memory pressure: below 60% is fine, below 80% is a warning.
pub fn memory_variant(percent: f64) -> Variant {
    if percent < 60.0 {
        Variant::Success
    } else if percent < 80.0 {
        Variant::Warning
    } else {
        Variant::Error
    }
}

/// Compute utilization: a busy GPU is the healthy case.
pub fn utilization_variant(percent: f64) -> Variant {
    if percent > 80.0 {
        Variant::Success
    } else if percent > 50.0 {
        Variant::Warning
    } else {
        Variant::Error
    }
}

pub fn temperature_variant(celsius: f64) -> Variant {
    if celsius < 70.0 {
        Variant::Success
    } else if celsius < 85.0 {
        Variant::Warning
    } else {
        Variant::Error
    }
}

/// Memory and utilization bars, temperature.
pub struct TerminalGpu<'a> {
    gpu: Option<&'a GpuStatus>,
    frame: PanelFrame,
}

impl<'a> TerminalGpu<'a> {
    pub fn new(gpu: Option<&'a GpuStatus>) -> Self {
        Self {
            gpu,
            frame: PanelFrame::default(),
        }
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let Some(gpu) = self.gpu else {
            return vec![Line::styled(
                "No GPU data available",
                Style::default().fg(colors::MUTED),
            )];
        };

        let bar_width = (width as usize).saturating_sub(LABEL_WIDTH + 1 + BAR_DECORATION);
        let memory = gpu.memory_percent();
        let utilization = gpu.utilization();

        let mut lines = vec![
            AsciiProgressBar::new(memory)
                .width(bar_width)
                .label("Memory")
                .variant(memory_variant(memory))
                .line(),
            Line::from(vec![
                Span::raw(" ".repeat(LABEL_WIDTH + 1)),
                Span::styled(
                    format!("{} / {}", format_gb(gpu.allocated_gb), format_gb(gpu.total_gb)),
                    Style::default().fg(colors::TEXT),
                ),
                Span::styled(
                    format!("  reserved {}", format_gb(gpu.reserved_gb)),
                    Style::default().fg(colors::MUTED),
                ),
            ]),
            AsciiProgressBar::new(utilization)
                .width(bar_width)
                .label("Util  ")
                .variant(utilization_variant(utilization))
                .line(),
        ];

        if let Some(temp) = gpu.temperature_c {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<width$} ", "Temp", width = LABEL_WIDTH),
                    Style::default().fg(colors::MUTED),
                ),
                Span::styled(
                    format!("{:.0}°C", temp),
                    temperature_variant(temp)
                        .style()
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        lines
    }
}

impl Widget for TerminalGpu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(self.frame.content_width(area.width));
        self.frame
            .boxed("GPU", area)
            .content(lines)
            .render(area, buf);
    }
}
