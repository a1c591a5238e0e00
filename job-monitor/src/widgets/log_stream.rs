use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, StatefulWidget, Widget};

use super::Variant;
use crate::format::format_time;
use crate::snapshot::{LogEntry, LogLevel};
use crate::theme::colors;

/// The most recent `max_lines` entries, in original order.
pub fn visible_entries(entries: &[LogEntry], max_lines: usize) -> &[LogEntry] {
    &entries[entries.len().saturating_sub(max_lines)..]
}

pub fn level_glyph(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "·",
        LogLevel::Info => "›",
        LogLevel::Warning => "!",
        LogLevel::Error => "✗",
    }
}

pub fn level_variant(level: LogLevel) -> Variant {
    match level {
        LogLevel::Debug => Variant::Muted,
        LogLevel::Info => Variant::Info,
        LogLevel::Warning => Variant::Warning,
        LogLevel::Error => Variant::Error,
    }
}

/// Scroll anchor of a [`LogStream`].
///
/// Jumps to the bottom when the log list grows; a list that changes without
/// growing keeps its scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStreamState {
    last_len: usize,
    offset: usize,
}

impl LogStreamState {
    /// Record a render of `total` entries, `visible` of them shown in a
    /// viewport `viewport` rows tall. Returns true if it scrolled to the
    /// bottom.
    pub fn observe(&mut self, total: usize, visible: usize, viewport: usize) -> bool {
        let max_offset = visible.saturating_sub(viewport);
        let grew = total > self.last_len;
        if grew {
            self.offset = max_offset;
        } else {
            self.offset = self.offset.min(max_offset);
        }
        self.last_len = total;
        grew
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
    }

    /// Scroll towards the newest entry. Clamped on the next render.
    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = self.offset.saturating_add(rows);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Tail of the job log with per-level glyphs and colors.
#[derive(Debug, Clone)]
pub struct LogStream<'a> {
    entries: &'a [LogEntry],
    max_lines: usize,
    show_timestamps: bool,
}

impl<'a> LogStream<'a> {
    pub fn new(entries: &'a [LogEntry]) -> Self {
        Self {
            entries,
            max_lines: 50,
            show_timestamps: true,
        }
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let visible = visible_entries(self.entries, self.max_lines);
        if visible.is_empty() {
            return vec![Line::styled(
                "Waiting for logs...",
                Style::default().fg(colors::MUTED),
            )];
        }

        visible.iter().map(|entry| self.entry_line(entry)).collect()
    }

    fn entry_line(&self, entry: &LogEntry) -> Line<'static> {
        let variant = level_variant(entry.level);
        let mut spans = Vec::with_capacity(3);
        if self.show_timestamps {
            spans.push(Span::styled(
                format!("[{}] ", format_time(&entry.timestamp)),
                Style::default().fg(colors::MUTED),
            ));
        }
        spans.push(Span::styled(
            format!("{} ", level_glyph(entry.level)),
            variant.style().add_modifier(Modifier::BOLD),
        ));
        let message_style = match entry.level {
            LogLevel::Debug => Variant::Muted.style(),
            LogLevel::Info => Variant::Default.style(),
            level => level_variant(level).style(),
        };
        spans.push(Span::styled(entry.message.clone(), message_style));
        Line::from(spans)
    }
}

impl StatefulWidget for LogStream<'_> {
    type State = LogStreamState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let visible = visible_entries(self.entries, self.max_lines).len();
        state.observe(self.entries.len(), visible, area.height as usize);

        let offset = u16::try_from(state.offset()).unwrap_or(u16::MAX);
        Paragraph::new(self.lines())
            .scroll((offset, 0))
            .render(area, buf);
    }
}
