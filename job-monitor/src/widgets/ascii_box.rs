use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Widget;

use crate::format::{create_box_border, truncate_to_width, BorderStyle};
use crate::theme::colors;

/// Cells taken by `┌─ ` and ` ` around a title.
const TITLE_OFFSET: u16 = 3;
const TITLE_DECORATION: usize = 5;

/// Titled frame around arbitrary content.
///
/// With an explicit width the content is framed in box-drawing borders.
/// Without one, border drawing is skipped: a bold title row followed by the
/// content indented by one column.
#[derive(Debug, Clone, Default)]
pub struct AsciiBox<'a> {
    title: String,
    width: Option<u16>,
    border: BorderStyle,
    content: Vec<Line<'a>>,
}

impl<'a> AsciiBox<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn width(mut self, width: Option<u16>) -> Self {
        self.width = width;
        self
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn content(mut self, content: Vec<Line<'a>>) -> Self {
        self.content = content;
        self
    }

    pub fn is_framed(&self) -> bool {
        self.width.is_some()
    }

    /// Area left for content once the frame or title row is drawn.
    pub fn inner(&self, area: Rect) -> Rect {
        match self.width {
            Some(width) => {
                let width = width.min(area.width);
                Rect {
                    x: area.x.saturating_add(2),
                    y: area.y.saturating_add(1),
                    width: width.saturating_sub(4),
                    height: area.height.saturating_sub(2),
                }
            }
            None => {
                let title_rows = u16::from(!self.title.is_empty());
                Rect {
                    x: area.x.saturating_add(1),
                    y: area.y.saturating_add(title_rows),
                    width: area.width.saturating_sub(2),
                    height: area.height.saturating_sub(title_rows),
                }
            }
        }
    }

    fn render_frame(&self, width: u16, area: Rect, buf: &mut Buffer) {
        let border = create_box_border(width as usize, self.border);
        let border_style = Style::default().fg(colors::BORDER);
        let right = area.x + width - 1;
        let bottom = area.y + area.height - 1;

        buf.set_string(area.x, area.y, border.titled_top(&self.title), border_style);
        if !self.title.is_empty() && border.width() > TITLE_DECORATION {
            let title = truncate_to_width(&self.title, border.width() - TITLE_DECORATION);
            buf.set_string(area.x + TITLE_OFFSET, area.y, title, title_style());
        }

        let vertical = border.chars.vertical.to_string();
        for y in (area.y + 1)..bottom {
            buf.set_string(area.x, y, &vertical, border_style);
            buf.set_string(right, y, &vertical, border_style);
        }
        if area.height >= 2 {
            buf.set_string(area.x, bottom, &border.bottom, border_style);
        }
    }
}

fn title_style() -> Style {
    Style::default()
        .fg(colors::TITLE)
        .add_modifier(Modifier::BOLD)
}

impl Widget for AsciiBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }

        match self.width {
            Some(width) => {
                let width = width.min(area.width);
                if width > 0 {
                    self.render_frame(width, area, buf);
                }
            }
            None => {
                if !self.title.is_empty() {
                    buf.set_stringn(
                        area.x,
                        area.y,
                        &self.title,
                        area.width as usize,
                        title_style(),
                    );
                }
            }
        }

        let inner = self.inner(area);
        for (row, line) in self.content.iter().enumerate().take(inner.height as usize) {
            buf.set_line(inner.x, inner.y + row as u16, line, inner.width);
        }
    }
}
