use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::action::{AvailableActions, MonitorAction};
use crate::keys::default_key;
use crate::snapshot::{JobStatus, MetricsSnapshot};
use crate::theme::colors;
use crate::widgets::Variant;

pub fn status_variant(status: JobStatus) -> Variant {
    match status {
        JobStatus::Queued | JobStatus::Pending => Variant::Muted,
        JobStatus::Running => Variant::Info,
        JobStatus::Completed => Variant::Success,
        JobStatus::Failed => Variant::Error,
        JobStatus::Cancelled => Variant::Muted,
        JobStatus::Paused => Variant::Warning,
    }
}

/// Buttons shown for `status`, given which callbacks exist.
pub fn header_buttons(status: JobStatus, available: AvailableActions) -> Vec<MonitorAction> {
    let mut buttons = Vec::with_capacity(2);
    if available.pause && status.can_pause() {
        buttons.push(MonitorAction::Pause);
    }
    if available.resume && status.can_resume() {
        buttons.push(MonitorAction::Resume);
    }
    if available.cancel && status.can_cancel() {
        buttons.push(MonitorAction::Cancel);
    }
    buttons
}

/// Job identity, status badge and action buttons.
pub struct TerminalHeader<'a> {
    snapshot: &'a MetricsSnapshot,
    available: AvailableActions,
    frame: PanelFrame,
}

impl<'a> TerminalHeader<'a> {
    pub fn new(snapshot: &'a MetricsSnapshot, available: AvailableActions) -> Self {
        Self {
            snapshot,
            available,
            frame: PanelFrame::default(),
        }
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn buttons(&self) -> Vec<MonitorAction> {
        header_buttons(self.snapshot.status, self.available)
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let s = self.snapshot;
        let variant = status_variant(s.status);
        let muted = Style::default().fg(colors::MUTED);
        let text = Style::default().fg(colors::TEXT);

        let mut identity = vec![
            Span::styled(
                format!("[{}] {}", s.status.icon(), s.status.label()),
                variant.style().add_modifier(Modifier::BOLD),
            ),
            Span::styled("  job ", muted),
            Span::styled(display_or_dash(&s.job_id), text),
            Span::styled("  model ", muted),
            Span::styled(display_or_dash(&s.model_name), text),
        ];

        let dataset = match (&s.dataset_name, &s.dataset_id) {
            (Some(name), Some(id)) => Some(format!("{} ({})", name, id)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(id)) => Some(id.clone()),
            (None, None) => None,
        };
        if let Some(dataset) = dataset {
            identity.push(Span::styled("  dataset ", muted));
            identity.push(Span::styled(dataset, text));
        }

        let mut buttons = Vec::new();
        for (i, action) in self.buttons().into_iter().enumerate() {
            if i > 0 {
                buttons.push(Span::raw("  "));
            }
            let button_variant = match action {
                MonitorAction::Cancel => Variant::Error,
                MonitorAction::Resume => Variant::Success,
                _ => Variant::Warning,
            };
            buttons.push(Span::styled(
                format!("[{}] {}", default_key(action), action.label()),
                button_variant.style().add_modifier(Modifier::BOLD),
            ));
        }

        vec![Line::from(identity), Line::from(buttons)]
    }
}

fn display_or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

impl Widget for TerminalHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        self.frame
            .boxed("JOB MONITOR", area)
            .content(lines)
            .render(area, buf);
    }
}
