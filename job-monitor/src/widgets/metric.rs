use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use super::Variant;
use crate::format::{format_trend, Trend, TrendDirection, TREND_DECIMALS};
use crate::theme::colors;

/// Which way a metric moves when training improves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricDirection {
    /// Losses, step times, perplexity
    LowerIsBetter,
    /// Accuracy, throughput
    #[default]
    HigherIsBetter,
}

impl MetricDirection {
    pub fn is_improvement(self, direction: TrendDirection) -> bool {
        matches!(
            (self, direction),
            (Self::LowerIsBetter, TrendDirection::Down) | (Self::HigherIsBetter, TrendDirection::Up)
        )
    }
}

/// Color of a trend: improvement is success, regression is error.
pub fn trend_variant(trend: &Trend, direction: MetricDirection) -> Variant {
    match trend.direction {
        TrendDirection::Flat => Variant::Muted,
        d if direction.is_improvement(d) => Variant::Success,
        _ => Variant::Error,
    }
}

/// `Label: value ↓ -0.0123`
#[derive(Debug, Clone)]
pub struct MetricDisplay<'a> {
    label: &'a str,
    value: String,
    variant: Variant,
    trend: Option<Trend>,
    direction: MetricDirection,
    decimals: usize,
}

impl<'a> MetricDisplay<'a> {
    pub fn new(label: &'a str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            variant: Variant::Default,
            trend: None,
            direction: MetricDirection::default(),
            decimals: TREND_DECIMALS,
        }
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn direction(mut self, direction: MetricDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Decimals used by a trend added afterwards.
    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Show the change from `previous` to `current`.
    pub fn trend(mut self, current: f64, previous: f64) -> Self {
        self.trend = Some(format_trend(current, previous, self.decimals));
        self
    }

    /// Color of the trend indicator, if one is shown.
    pub fn trend_variant(&self) -> Option<Variant> {
        self.trend
            .as_ref()
            .map(|trend| trend_variant(trend, self.direction))
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(format!("{}: ", self.label), Style::default().fg(colors::MUTED)),
            Span::styled(
                self.value.clone(),
                self.variant.style().add_modifier(Modifier::BOLD),
            ),
        ];

        if let (Some(trend), Some(variant)) = (&self.trend, self.trend_variant()) {
            spans.push(Span::styled(
                format!(" {} {}", trend.arrow, trend.delta),
                variant.style(),
            ));
        }

        Line::from(spans)
    }
}

impl Widget for MetricDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::plain_text;

    #[test]
    fn test_loss_decrease_is_success() {
        let metric = MetricDisplay::new("Train Loss", "0.5000")
            .direction(MetricDirection::LowerIsBetter)
            .trend(0.5, 0.7);
        assert_eq!(metric.trend_variant(), Some(Variant::Success));
    }

    #[test]
    fn test_accuracy_decrease_is_failure() {
        let metric = MetricDisplay::new("Accuracy", "0.81")
            .direction(MetricDirection::HigherIsBetter)
            .trend(0.81, 0.84);
        assert_eq!(metric.trend_variant(), Some(Variant::Error));
    }

    #[test]
    fn test_loss_increase_is_failure() {
        let metric = MetricDisplay::new("Eval Loss", "1.2")
            .direction(MetricDirection::LowerIsBetter)
            .trend(1.2, 1.0);
        assert_eq!(metric.trend_variant(), Some(Variant::Error));
    }

    #[test]
    fn test_flat_trend_is_muted() {
        let metric = MetricDisplay::new("Loss", "1.0").trend(1.0, 1.0);
        assert_eq!(metric.trend_variant(), Some(Variant::Muted));
    }

    #[test]
    fn test_line_text() {
        let metric = MetricDisplay::new("Loss", "0.5000")
            .direction(MetricDirection::LowerIsBetter)
            .decimals(2)
            .trend(0.5, 0.75);
        assert_eq!(plain_text(&metric.line()), "Loss: 0.5000 ↓ -0.25");

        let bare = MetricDisplay::new("LR", "1.00e-4");
        assert_eq!(plain_text(&bare.line()), "LR: 1.00e-4");
        assert!(bare.trend_variant().is_none());
    }
}
