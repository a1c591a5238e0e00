//! Primitive renderers.
//!
//! Stateless building blocks with no knowledge of jobs or training. Each
//! exposes a pure function producing styled [`Line`]s (inspectable without a
//! terminal) and a ratatui widget that renders those lines.

mod ascii_box;
mod log_stream;
mod metric;
mod progress_bar;
mod shortcuts;
mod sparkline;
mod variant;

pub use ascii_box::AsciiBox;
pub use log_stream::{level_glyph, level_variant, visible_entries, LogStream, LogStreamState};
pub use metric::{trend_variant, MetricDirection, MetricDisplay};
pub use progress_bar::AsciiProgressBar;
pub use shortcuts::{KeyboardShortcuts, ShortcutAction};
pub use sparkline::{build_sparkline_grid, AsciiSparkline, SparklineGrid};
pub use variant::Variant;

use ratatui::text::Line;

/// Concatenated content of a line, without styling.
pub fn plain_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
