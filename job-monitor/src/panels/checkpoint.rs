use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Widget;

use super::PanelFrame;
use crate::format::{format_loss, format_time};
use crate::snapshot::CheckpointSummary;
use crate::theme::colors;
use crate::widgets::{MetricDisplay, Variant};

/// Best checkpoint saved so far.
pub struct TerminalCheckpoint<'a> {
    checkpoint: Option<&'a CheckpointSummary>,
    frame: PanelFrame,
}

impl<'a> TerminalCheckpoint<'a> {
    pub fn new(checkpoint: Option<&'a CheckpointSummary>) -> Self {
        Self {
            checkpoint,
            frame: PanelFrame::default(),
        }
    }

    pub fn frame(mut self, frame: PanelFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let Some(checkpoint) = self.checkpoint else {
            return vec![Line::styled(
                "No checkpoint saved yet",
                Style::default().fg(colors::MUTED),
            )];
        };

        let mut lines = vec![
            MetricDisplay::new("Epoch", checkpoint.epoch.to_string()).line(),
            MetricDisplay::new("Step", checkpoint.step.to_string()).line(),
            match checkpoint.eval_loss {
                Some(loss) => MetricDisplay::new("Eval Loss", format_loss(loss))
                    .variant(Variant::Success)
                    .line(),
                None => MetricDisplay::new("Eval Loss", "N/A")
                    .variant(Variant::Muted)
                    .line(),
            },
        ];
        if let Some(loss) = checkpoint.train_loss {
            lines.push(MetricDisplay::new("Train Loss", format_loss(loss)).line());
        }
        if let Some(saved_at) = &checkpoint.saved_at {
            lines.push(
                MetricDisplay::new("Saved", format_time(saved_at))
                    .variant(Variant::Muted)
                    .line(),
            );
        }
        lines
    }
}

impl Widget for TerminalCheckpoint<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.lines();
        self.frame
            .boxed("CHECKPOINT", area)
            .content(lines)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::plain_text;
    use chrono::{TimeZone, Utc};

    fn texts(checkpoint: Option<&CheckpointSummary>) -> Vec<String> {
        TerminalCheckpoint::new(checkpoint)
            .lines()
            .iter()
            .map(plain_text)
            .collect()
    }

    #[test]
    fn test_placeholder_without_checkpoint() {
        assert_eq!(texts(None), vec!["No checkpoint saved yet"]);
    }

    #[test]
    fn test_missing_eval_loss_is_na() {
        let checkpoint = CheckpointSummary {
            epoch: 2,
            step: 400,
            ..Default::default()
        };
        assert_eq!(
            texts(Some(&checkpoint)),
            vec!["Epoch: 2", "Step: 400", "Eval Loss: N/A"]
        );
    }

    #[test]
    fn test_optional_rows() {
        let checkpoint = CheckpointSummary {
            epoch: 3,
            step: 600,
            eval_loss: Some(0.91234),
            train_loss: Some(0.85),
            saved_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        };
        let rows = texts(Some(&checkpoint));
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], "Eval Loss: 0.9123");
        assert_eq!(rows[3], "Train Loss: 0.8500");
        assert!(rows[4].starts_with("Saved: "));
    }
}
