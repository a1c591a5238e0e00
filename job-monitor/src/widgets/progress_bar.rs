use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::Variant;
use crate::format::{clamp_percent, generate_progress_bar, BarChars};
use crate::theme::colors;

/// Width used when the caller does not size the bar.
const DEFAULT_WIDTH: usize = 30;

/// `Label [█████░░░░░] 50.0%`
#[derive(Debug, Clone)]
pub struct AsciiProgressBar<'a> {
    value: f64,
    width: usize,
    label: Option<&'a str>,
    show_percentage: bool,
    variant: Variant,
    chars: BarChars,
}

impl<'a> AsciiProgressBar<'a> {
    pub fn new(value: f64) -> Self {
        Self {
            value: clamp_percent(value),
            width: DEFAULT_WIDTH,
            label: None,
            show_percentage: true,
            variant: Variant::Info,
            chars: BarChars::default(),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn show_percentage(mut self, show: bool) -> Self {
        self.show_percentage = show;
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn chars(mut self, chars: BarChars) -> Self {
        self.chars = chars;
        self
    }

    /// Clamped value in `[0, 100]`.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bar_text(&self) -> String {
        generate_progress_bar(self.value, self.width, self.chars)
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = Vec::with_capacity(5);
        if let Some(label) = self.label {
            spans.push(Span::styled(
                format!("{} ", label),
                Style::default().fg(colors::MUTED),
            ));
        }
        spans.push(Span::styled("[", Style::default().fg(colors::BORDER)));
        spans.push(Span::styled(self.bar_text(), self.variant.style()));
        spans.push(Span::styled("]", Style::default().fg(colors::BORDER)));
        if self.show_percentage {
            spans.push(Span::styled(
                format!(" {:>5.1}%", self.value),
                self.variant.style().add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }
}

impl Widget for AsciiProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::plain_text;

    #[test]
    fn test_clamps_input() {
        assert_eq!(AsciiProgressBar::new(-20.0).value(), 0.0);
        assert_eq!(AsciiProgressBar::new(140.0).value(), 100.0);
    }

    #[test]
    fn test_line_layout() {
        let bar = AsciiProgressBar::new(50.0)
            .width(10)
            .label("Epoch")
            .chars(BarChars::ASCII);
        assert_eq!(plain_text(&bar.line()), "Epoch [#####-----]  50.0%");
    }

    #[test]
    fn test_without_percentage() {
        let bar = AsciiProgressBar::new(25.0)
            .width(4)
            .show_percentage(false)
            .chars(BarChars::ASCII);
        assert_eq!(plain_text(&bar.line()), "[#---]");
    }

    #[test]
    fn test_variant_only_changes_color() {
        let info = AsciiProgressBar::new(40.0).width(8);
        let error = AsciiProgressBar::new(40.0).width(8).variant(Variant::Error);
        assert_eq!(plain_text(&info.line()), plain_text(&error.line()));
        assert_ne!(info.line().spans[1].style, error.line().spans[1].style);
    }
}
