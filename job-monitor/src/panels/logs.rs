use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{StatefulWidget, Widget};

use super::PanelFrame;
use crate::snapshot::LogEntry;
use crate::widgets::{visible_entries, LogStream, LogStreamState};

/// Framed tail of the job log.
pub struct TerminalLogs<'a> {
    entries: &'a [LogEntry],
    max_lines: usize,
    frame: PanelFrame,
}

impl<'a> TerminalLogs<'a> {
    pub fn new(entries: &'a [LogEntry]) -> Self {
        Self {
            entries,
            max_lines: 50,
            frame: PanelFrame::default(),
        }
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn title(&self) -> String {
        let shown = visible_entries(self.entries, self.max_lines).len();
        if shown == 0 {
            "LOGS".to_string()
        } else {
            format!("LOGS ({})", shown)
        }
    }
}

impl StatefulWidget for TerminalLogs<'_> {
    type State = LogStreamState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let boxed = self.frame.boxed(self.title(), area);
        let inner = boxed.inner(area).intersection(buf.area);
        boxed.render(area, buf);
        if inner.is_empty() {
            return;
        }

        LogStream::new(self.entries)
            .max_lines(self.max_lines)
            .render(inner, buf, state);
    }
}
