use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::action::MonitorAction;
use crate::theme::colors;

/// One entry of the shortcut legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutAction {
    /// Key as printed, e.g. `P` or `F5`
    pub key: String,
    pub label: String,
    pub action: Option<MonitorAction>,
    pub disabled: bool,
}

impl ShortcutAction {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            action: None,
            disabled: false,
        }
    }

    pub fn for_action(key: impl Into<String>, action: MonitorAction) -> Self {
        Self {
            action: Some(action),
            ..Self::new(key, action.label())
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Legend of keyboard shortcuts. Display only; key handling lives in
/// [`crate::keys`].
#[derive(Debug, Clone)]
pub struct KeyboardShortcuts<'a> {
    actions: &'a [ShortcutAction],
    compact: bool,
}

impl<'a> KeyboardShortcuts<'a> {
    pub fn new(actions: &'a [ShortcutAction]) -> Self {
        Self {
            actions,
            compact: false,
        }
    }

    /// `P:Pause  C:Cancel` instead of `[P] Pause   [C] Cancel`.
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn line(&self) -> Line<'static> {
        let separator = if self.compact { "  " } else { "   " };
        let mut spans = Vec::with_capacity(self.actions.len() * 3);

        for (i, shortcut) in self.actions.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(separator));
            }

            let (key_style, label_style) = if shortcut.disabled {
                let dim = Style::default()
                    .fg(colors::MUTED)
                    .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
                (dim, dim)
            } else {
                (
                    Style::default()
                        .fg(colors::HELP_KEY)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(colors::TEXT),
                )
            };

            if self.compact {
                spans.push(Span::styled(shortcut.key.clone(), key_style));
                spans.push(Span::styled(format!(":{}", shortcut.label), label_style));
            } else {
                spans.push(Span::styled(format!("[{}]", shortcut.key), key_style));
                spans.push(Span::styled(format!(" {}", shortcut.label), label_style));
            }
        }

        Line::from(spans)
    }
}

impl Widget for KeyboardShortcuts<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line())
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
