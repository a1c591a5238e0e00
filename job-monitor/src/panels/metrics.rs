use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::format::{format_learning_rate, format_loss, TREND_DECIMALS};
use crate::snapshot::MetricsSnapshot;
use crate::widgets::{AsciiSparkline, MetricDirection, MetricDisplay, Variant};

/// Loss against the best eval loss, learning rate, and their histories.
pub struct TerminalMetrics<'a> {
    snapshot: &'a MetricsSnapshot,
    frame: PanelFrame,
    sparkline_height: u16,
    decimals: usize,
}

impl<'a> TerminalMetrics<'a> {
    pub fn new(snapshot: &'a MetricsSnapshot) -> Self {
        Self {
            snapshot,
            frame: PanelFrame::default(),
            sparkline_height: 5,
            decimals: TREND_DECIMALS,
        }
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn sparkline_height(mut self, height: u16) -> Self {
        self.sparkline_height = height;
        self
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Current loss with its trend against the best eval loss.
    pub fn loss_display(&self) -> MetricDisplay<'static> {
        let s = self.snapshot;
        let Some(current) = s.current_loss() else {
            return MetricDisplay::new("Loss", "--").variant(Variant::Muted);
        };

        let display = MetricDisplay::new("Loss", format_loss(current))
            .variant(Variant::Info)
            .direction(MetricDirection::LowerIsBetter)
            .decimals(self.decimals);
        match s.best_eval_loss {
            Some(best) => display.trend(current, best),
            None => display,
        }
    }

    /// Learning rate. Never carries a trend.
    pub fn learning_rate_display(&self) -> MetricDisplay<'static> {
        match self.snapshot.learning_rate {
            Some(lr) => MetricDisplay::new("Learning Rate", format_learning_rate(lr)),
            None => MetricDisplay::new("Learning Rate", "--").variant(Variant::Muted),
        }
    }

    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let s = self.snapshot;
        let width = width as usize;
        let mut lines = vec![self.loss_display().line()];

        let mut secondary = Vec::new();
        if let (Some(_), Some(eval)) = (s.train_loss, s.eval_loss) {
            secondary.push(MetricDisplay::new("Eval", format_loss(eval)));
        }
        secondary.push(match s.best_eval_loss {
            Some(best) => {
                MetricDisplay::new("Best Eval", format_loss(best)).variant(Variant::Success)
            }
            None => MetricDisplay::new("Best Eval", "--").variant(Variant::Muted),
        });
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, metric) in secondary.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.extend(metric.line().spans);
        }
        lines.push(Line::from(spans));

        lines.extend(
            AsciiSparkline::new(&s.loss_history)
                .height(self.sparkline_height)
                .variant(Variant::Info)
                .show_range(true)
                .lines(width),
        );

        lines.push(Line::default());
        lines.push(self.learning_rate_display().line());
        lines.extend(
            AsciiSparkline::new(&s.lr_history)
                .height((self.sparkline_height / 2).max(2))
                .variant(Variant::Muted)
                .lines(width),
        );

        lines
    }
}

impl Widget for TerminalMetrics<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines(self.frame.content_width(area.width));
        self.frame
            .boxed("METRICS", area)
            .content(lines)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ChartDataPoint;
    use crate::widgets::plain_text;

    #[test]
    fn test_loss_improving_against_best() {
        let s = MetricsSnapshot {
            train_loss: Some(0.8),
            best_eval_loss: Some(1.0),
            ..Default::default()
        };
        let panel = TerminalMetrics::new(&s);
        assert_eq!(panel.loss_display().trend_variant(), Some(Variant::Success));
        assert_eq!(
            plain_text(&panel.loss_display().line()),
            "Loss: 0.8000 ↓ -0.2000"
        );
    }

    #[test]
    fn test_falls_back_to_eval_loss() {
        let s = MetricsSnapshot {
            eval_loss: Some(1.3),
            best_eval_loss: Some(1.1),
            ..Default::default()
        };
        let panel = TerminalMetrics::new(&s);
        assert_eq!(panel.loss_display().trend_variant(), Some(Variant::Error));
    }

    #[test]
    fn test_no_trend_without_baseline() {
        let s = MetricsSnapshot {
            train_loss: Some(0.8),
            ..Default::default()
        };
        assert!(TerminalMetrics::new(&s).loss_display().trend_variant().is_none());
    }

    #[test]
    fn test_learning_rate_has_no_trend() {
        let s = MetricsSnapshot {
            learning_rate: Some(2e-5),
            lr_history: vec![ChartDataPoint::new(0.0, 1e-5), ChartDataPoint::new(1.0, 2e-5)],
            ..Default::default()
        };
        let panel = TerminalMetrics::new(&s);
        let lr = panel.learning_rate_display();
        assert!(lr.trend_variant().is_none());
        assert_eq!(plain_text(&lr.line()), "Learning Rate: 2.00e-5");
    }

    #[test]
    fn test_empty_histories_show_placeholders() {
        let s = MetricsSnapshot::default();
        let texts: Vec<String> = TerminalMetrics::new(&s)
            .lines(30)
            .iter()
            .map(plain_text)
            .collect();
        assert_eq!(texts[0], "Loss: --");
        assert_eq!(texts.iter().filter(|t| *t == "No data").count(), 2);
    }
}
