//! Fixed-width text formatting for the terminal monitor.
//!
//! Pure functions only. Widgets call these to turn numbers and timestamps
//! into glyph strings; nothing here knows about colors or terminals.

use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Default number of decimals in a trend delta.
pub const TREND_DECIMALS: usize = 4;

/// Characters used to draw a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarChars {
    pub filled: char,
    pub empty: char,
}

impl Default for BarChars {
    fn default() -> Self {
        Self {
            filled: '█',
            empty: '░',
        }
    }
}

impl BarChars {
    /// Plain ASCII bar, `#` on `-`.
    pub const ASCII: BarChars = BarChars {
        filled: '#',
        empty: '-',
    };
}

/// Clamp a percentage into `[0, 100]`. NaN becomes 0.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Percentage of `current` out of `total`, with `total` treated as at least 1.
pub fn percent_of(current: u64, total: u64) -> f64 {
    let total = total.max(1);
    clamp_percent(current as f64 / total as f64 * 100.0)
}

/// Number of filled cells for `percent` in a bar of `width` cells.
pub fn filled_cells(percent: f64, width: usize) -> usize {
    let filled = (clamp_percent(percent) / 100.0 * width as f64).floor() as usize;
    filled.min(width)
}

/// Build a bar of exactly `width` characters, `floor(percent/100 * width)` of
/// them filled.
pub fn generate_progress_bar(percent: f64, width: usize, chars: BarChars) -> String {
    let filled = filled_cells(percent, width);
    let mut bar = String::with_capacity(width * chars.filled.len_utf8());
    bar.extend(std::iter::repeat(chars.filled).take(filled));
    bar.extend(std::iter::repeat(chars.empty).take(width - filled));
    bar
}

/// Line style for box borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
}

/// Box-drawing characters for one [`BorderStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderStyle {
    pub fn chars(self) -> BoxChars {
        match self {
            Self::Single => BoxChars {
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
                horizontal: '─',
                vertical: '│',
            },
            Self::Double => BoxChars {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
            },
        }
    }
}

/// Border strings for a box of a given width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxBorder {
    pub top: String,
    pub bottom: String,
    pub horizontal: String,
    pub chars: BoxChars,
    width: usize,
}

impl BoxBorder {
    /// Width in cells of every border string.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Top border with `title` embedded after the corner, e.g. `┌─ LOSS ───┐`.
    ///
    /// The title is truncated to fit by display width; boxes too narrow for
    /// any title get the plain top border.
    pub fn titled_top(&self, title: &str) -> String {
        const DECORATION: usize = 5;

        if title.is_empty() || self.width <= DECORATION {
            return self.top.clone();
        }

        let max_title = self.width - DECORATION;
        let title = truncate_to_width(title, max_title);
        let fill = max_title - title.width();
        let c = self.chars;

        let mut line = String::with_capacity(self.width * 3);
        line.push(c.top_left);
        line.push(c.horizontal);
        line.push(' ');
        line.push_str(&title);
        line.push(' ');
        line.extend(std::iter::repeat(c.horizontal).take(fill));
        line.push(c.top_right);
        line
    }
}

/// Longest prefix of `text` that fits in `max_width` terminal cells.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= max_width
        })
        .collect()
}

/// Border strings for a box `width` cells wide.
pub fn create_box_border(width: usize, style: BorderStyle) -> BoxBorder {
    let c = style.chars();
    let horizontal: String = std::iter::repeat(c.horizontal).take(width).collect();

    let (top, bottom) = if width < 2 {
        (horizontal.clone(), horizontal.clone())
    } else {
        let inner: String = std::iter::repeat(c.horizontal).take(width - 2).collect();
        (
            format!("{}{}{}", c.top_left, inner, c.top_right),
            format!("{}{}{}", c.bottom_left, inner, c.bottom_right),
        )
    };

    BoxBorder {
        top,
        bottom,
        horizontal,
        chars: c,
        width,
    }
}

/// Direction of change between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Arrow plus signed delta between two readings.
///
/// Whether a direction is good news is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub arrow: char,
    pub delta: String,
    pub direction: TrendDirection,
}

/// Compare `current` against `previous`.
pub fn format_trend(current: f64, previous: f64, decimals: usize) -> Trend {
    let diff = current - previous;

    if diff > 0.0 {
        Trend {
            arrow: '↑',
            delta: format!("+{:.*}", decimals, diff),
            direction: TrendDirection::Up,
        }
    } else if diff < 0.0 {
        Trend {
            arrow: '↓',
            delta: format!("-{:.*}", decimals, diff.abs()),
            direction: TrendDirection::Down,
        }
    } else {
        Trend {
            arrow: '→',
            delta: format!("{:.*}", decimals, 0.0),
            direction: TrendDirection::Flat,
        }
    }
}

/// Short local time, `HH:MM:SS`.
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Human-readable duration: `42s`, `3m 5s`, `2h 4m`.
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "--".to_string();
    }

    let secs = secs.round() as u64;
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Format a count with K/M/B suffixes.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.1}", value)
    }
}

pub fn format_loss(loss: f64) -> String {
    format!("{:.4}", loss)
}

pub fn format_learning_rate(lr: f64) -> String {
    format!("{:.2e}", lr)
}

pub fn format_gb(gb: f64) -> String {
    format!("{:.1} GB", gb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn filled_count(bar: &str, chars: BarChars) -> usize {
        bar.chars().filter(|&c| c == chars.filled).count()
    }

    #[test]
    fn test_progress_bar_length_and_fill_over_range() {
        let chars = BarChars::default();
        for width in [0usize, 1, 7, 20, 33] {
            let mut percent = -50.0;
            while percent <= 150.0 {
                let bar = generate_progress_bar(percent, width, chars);
                assert_eq!(bar.chars().count(), width, "width at {percent}%");

                let expected = (percent.clamp(0.0, 100.0) / 100.0 * width as f64).floor() as usize;
                assert_eq!(filled_count(&bar, chars), expected, "fill at {percent}%");
                percent += 2.5;
            }
        }
    }

    #[test]
    fn test_progress_bar_edges() {
        let chars = BarChars::ASCII;
        assert_eq!(generate_progress_bar(0.0, 10, chars), "----------");
        assert_eq!(generate_progress_bar(100.0, 10, chars), "##########");
        assert_eq!(generate_progress_bar(99.9, 10, chars), "#########-");
        assert_eq!(generate_progress_bar(f64::NAN, 4, chars), "----");
    }

    #[test]
    fn test_percent_of_defaults_total() {
        assert_eq!(percent_of(0, 0), 0.0);
        assert_eq!(percent_of(5, 5), 100.0);
        assert_eq!(percent_of(1, 0), 100.0);
        assert_eq!(percent_of(50, 200), 25.0);
        assert_eq!(percent_of(300, 200), 100.0);
    }

    #[test]
    fn test_box_border_single() {
        let border = create_box_border(6, BorderStyle::Single);
        assert_eq!(border.top, "┌────┐");
        assert_eq!(border.bottom, "└────┘");
        assert_eq!(border.horizontal, "──────");
        assert_eq!(border.chars.vertical, '│');
    }

    #[test]
    fn test_box_border_double() {
        let border = create_box_border(4, BorderStyle::Double);
        assert_eq!(border.top, "╔══╗");
        assert_eq!(border.bottom, "╚══╝");
    }

    #[test]
    fn test_titled_top_fits_width() {
        let border = create_box_border(16, BorderStyle::Single);
        let top = border.titled_top("LOSS");
        assert_eq!(top, "┌─ LOSS ───────┐");
        assert_eq!(top.chars().count(), 16);

        let narrow = create_box_border(9, BorderStyle::Single);
        let top = narrow.titled_top("CHECKPOINT");
        assert_eq!(top.chars().count(), 9);
        assert!(top.contains("CHEC"));
    }

    #[test]
    fn test_titled_top_measures_wide_titles() {
        let border = create_box_border(16, BorderStyle::Single);
        let top = border.titled_top("训练指标监控面板");
        assert_eq!(top.width(), 16);
        assert_eq!(top, "┌─ 训练指标监 ─┐");

        let top = border.titled_top("GPU 显存");
        assert_eq!(top.width(), 16);
        assert!(top.ends_with('┐'));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("LOSS", 10), "LOSS");
        assert_eq!(truncate_to_width("LOSS", 2), "LO");
        assert_eq!(truncate_to_width("显存", 3), "显");
        assert_eq!(truncate_to_width("显存", 0), "");
    }

    #[test]
    fn test_trend_sign_matches_difference() {
        let pairs = [
            (0.5, 0.7),
            (0.7, 0.5),
            (1.0, 1.0),
            (-3.25, 2.0),
            (1e-3, 2e-3),
            (100.0, 99.99995),
        ];
        for (current, previous) in pairs {
            let trend = format_trend(current, previous, TREND_DECIMALS);
            let diff: f64 = current - previous;

            if diff > 0.0 {
                assert!(trend.delta.starts_with('+'));
                assert_eq!(trend.arrow, '↑');
            } else if diff < 0.0 {
                assert!(trend.delta.starts_with('-'));
                assert_eq!(trend.arrow, '↓');
            } else {
                assert_eq!(trend.direction, TrendDirection::Flat);
            }

            let magnitude = trend.delta.trim_start_matches(['+', '-']);
            assert_eq!(magnitude, format!("{:.4}", diff.abs()));
        }
    }

    #[test]
    fn test_trend_decimals() {
        let trend = format_trend(2.0, 1.5, 2);
        assert_eq!(trend.delta, "+0.50");
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_format_time_is_short() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let formatted = format_time(&ts);
        assert_eq!(formatted.len(), 8);
        assert_eq!(&formatted[2..3], ":");
        assert!(formatted.ends_with(":45"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.0), "42s");
        assert_eq!(format_duration(185.0), "3m 5s");
        assert_eq!(format_duration(7440.0), "2h 4m");
        assert_eq!(format_duration(-1.0), "--");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(950.0), "950.0");
        assert_eq!(format_compact(12_500.0), "12.5K");
        assert_eq!(format_compact(3_400_000.0), "3.40M");
        assert_eq!(format_compact(2_000_000_000.0), "2.00B");
    }

    #[test]
    fn test_format_learning_rate() {
        assert_eq!(format_learning_rate(0.0001), "1.00e-4");
    }
}
