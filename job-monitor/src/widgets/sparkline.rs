use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};

use super::Variant;
use crate::snapshot::ChartDataPoint;
use crate::theme::colors;

const POINT: char = '●';
const CONNECTOR: char = '│';
const EMPTY: char = ' ';

/// Character grid of a line chart. Row 0 is the top of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SparklineGrid {
    pub rows: Vec<Vec<char>>,
    pub min: f64,
    pub max: f64,
}

impl SparklineGrid {
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().collect()).collect()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Plot the last `width` points into a `height`-row grid.
///
/// Min and max come from the plotted slice. A flat series uses a range of 1
/// so every point lands on the bottom row. Non-finite samples leave a gap.
/// Returns `None` when there is nothing to plot.
pub fn build_sparkline_grid(
    points: &[ChartDataPoint],
    width: usize,
    height: usize,
) -> Option<SparklineGrid> {
    if width == 0 || height == 0 {
        return None;
    }

    let visible = &points[points.len().saturating_sub(width)..];
    let (min, max) = visible
        .iter()
        .map(|p| p.y)
        .filter(|y| y.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })?;

    let top = height - 1;
    let mut rows = vec![vec![EMPTY; visible.len()]; height];
    let mut prev_row: Option<usize> = None;

    for (col, point) in visible.iter().enumerate() {
        if !point.y.is_finite() {
            prev_row = None;
            continue;
        }

        let level = (scale(point.y, min, max) * top as f64).round() as usize;
        let row = top - level.min(top);

        if let Some(prev) = prev_row {
            let (lo, hi) = if prev < row { (prev, row) } else { (row, prev) };
            for r in (lo + 1)..hi {
                if rows[r][col] == EMPTY {
                    rows[r][col] = CONNECTOR;
                }
            }
        }

        rows[row][col] = POINT;
        prev_row = Some(row);
    }

    Some(SparklineGrid { rows, min, max })
}

/// Position of `y` within `[min, max]` as a fraction in `[0, 1]`.
fn scale(y: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    let range = max - min;
    if range.is_finite() {
        (y - min) / range
    } else {
        // The span of two huge finite values overflows; halve before subtracting.
        (y / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0)
    }
}

/// Compact character-grid line chart.
#[derive(Debug, Clone)]
pub struct AsciiSparkline<'a> {
    data: &'a [ChartDataPoint],
    height: u16,
    width: Option<usize>,
    variant: Variant,
    show_range: bool,
}

impl<'a> AsciiSparkline<'a> {
    pub fn new(data: &'a [ChartDataPoint]) -> Self {
        Self {
            data,
            height: 5,
            width: None,
            variant: Variant::Info,
            show_range: false,
        }
    }

    pub fn height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Fixed chart width. Defaults to the render area's width.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Append a `min … max …` line under the chart.
    pub fn show_range(mut self, show: bool) -> Self {
        self.show_range = show;
        self
    }

    pub fn lines(&self, available_width: usize) -> Vec<Line<'static>> {
        let width = self.width.unwrap_or(available_width);
        let Some(grid) = build_sparkline_grid(self.data, width, self.height as usize) else {
            return vec![Line::styled("No data", Style::default().fg(colors::MUTED))];
        };

        let mut lines: Vec<Line<'static>> = grid
            .lines()
            .into_iter()
            .map(|row| Line::styled(row, self.variant.style()))
            .collect();

        if self.show_range {
            lines.push(Line::styled(
                format!("min {:.4}  max {:.4}", grid.min, grid.max),
                Style::default().fg(colors::MUTED),
            ));
        }
        lines
    }
}

impl Widget for AsciiSparkline<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines(area.width as usize)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::plain_text;

    fn series(values: &[f64]) -> Vec<ChartDataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| ChartDataPoint::new(i as f64, y))
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_grid() {
        assert!(build_sparkline_grid(&[], 10, 4).is_none());
        let lines = AsciiSparkline::new(&[]).lines(20);
        assert_eq!(plain_text(&lines[0]), "No data");
    }

    #[test]
    fn test_single_point_uses_unit_range() {
        let data = series(&[2.5]);
        let grid = build_sparkline_grid(&data, 10, 4).unwrap();
        assert_eq!(grid.min, 2.5);
        assert_eq!(grid.max, 2.5);
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.rows[3][0], POINT);
    }

    #[test]
    fn test_extremes_hit_top_and_bottom() {
        let data = series(&[0.0, 1.0]);
        let grid = build_sparkline_grid(&data, 10, 3).unwrap();
        assert_eq!(grid.lines(), vec![" ●", " │", "● "]);
    }

    #[test]
    fn test_connectors_fill_gaps_between_rows() {
        let data = series(&[4.0, 0.0, 4.0]);
        let grid = build_sparkline_grid(&data, 3, 5).unwrap();
        assert_eq!(grid.lines(), vec!["● ●", " ││", " ││", " ││", " ● "]);
    }

    #[test]
    fn test_keeps_last_points_when_wider_than_chart() {
        let data = series(&[9.0, 9.0, 1.0, 2.0, 3.0]);
        let grid = build_sparkline_grid(&data, 3, 3).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.min, 1.0);
        assert_eq!(grid.max, 3.0);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let data = series(&[f64::NAN, 1.0, f64::INFINITY, 2.0]);
        let grid = build_sparkline_grid(&data, 10, 2).unwrap();
        assert_eq!(grid.lines(), vec!["   ●", " ●  "]);
    }

    #[test]
    fn test_extreme_finite_values_keep_their_rows() {
        let data = series(&[-1e308, 1e308]);
        let grid = build_sparkline_grid(&data, 10, 3).unwrap();
        assert_eq!(grid.lines(), vec![" ●", " │", "● "]);

        let data = series(&[-f64::MAX, 0.0, f64::MAX]);
        let grid = build_sparkline_grid(&data, 10, 3).unwrap();
        assert_eq!(grid.lines(), vec!["  ●", " ● ", "●  "]);
    }

    #[test]
    fn test_range_line() {
        let data = series(&[1.0, 3.0]);
        let lines = AsciiSparkline::new(&data).height(2).show_range(true).lines(10);
        assert_eq!(lines.len(), 3);
        assert_eq!(plain_text(&lines[2]), "min 1.0000  max 3.0000");
    }
}
