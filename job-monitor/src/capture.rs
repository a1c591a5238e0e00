//! Off-screen frame capture.
//!
//! Renders the monitor into ratatui's `TestBackend` and serializes the
//! resulting buffer, so a frame can be printed without a live terminal
//! (`--once`) or inspected by tests.

use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier};
use ratatui::{Frame, Terminal};

use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::monitor::{MonitorProps, MonitorState, TerminalMonitor};

/// Output format for captured frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureFormat {
    /// Plain text (no formatting)
    #[default]
    Plain,
    /// ANSI escape sequences for terminal colors
    Ansi,
}

impl CaptureFormat {
    pub fn serialize(self, buffer: &Buffer) -> String {
        match self {
            Self::Plain => buffer_to_plain(buffer),
            Self::Ansi => buffer_to_ansi(buffer),
        }
    }
}

/// Draw one frame of `width` x `height` cells off-screen.
pub fn render_frame<F>(width: u16, height: u16, draw: F) -> MonitorResult<Buffer>
where
    F: FnOnce(&mut Frame),
{
    let mut terminal = Terminal::new(TestBackend::new(width, height))?;
    terminal.draw(draw)?;
    Ok(terminal.backend().buffer().clone())
}

/// Render the monitor for `props` and serialize the frame.
pub fn capture_monitor(
    props: MonitorProps<'_>,
    config: &MonitorConfig,
    state: &mut MonitorState,
    width: u16,
    height: u16,
    format: CaptureFormat,
) -> MonitorResult<String> {
    let buffer = render_frame(width, height, |frame| {
        let area = frame.area();
        frame.render_stateful_widget(TerminalMonitor::new(props, config), area, state);
    })?;
    Ok(format.serialize(&buffer))
}

/// Convert buffer to plain text, one line per row.
pub fn buffer_to_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut output = String::with_capacity(area.area() as usize + area.height as usize);

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            output.push_str(buffer[(x, y)].symbol());
        }
        output.push('\n');
    }

    output
}

/// Convert buffer to ANSI escape sequences.
pub fn buffer_to_ansi(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut output = String::new();

    for y in area.y..area.y + area.height {
        let mut last_fg = Color::Reset;
        let mut last_bg = Color::Reset;
        let mut last_modifiers = Modifier::empty();

        for x in area.x..area.x + area.width {
            let cell = &buffer[(x, y)];

            if cell.fg != last_fg || cell.bg != last_bg || cell.modifier != last_modifiers {
                output.push_str("\x1b[0m");
                output.push_str(&modifier_to_ansi(cell.modifier));
                output.push_str(&color_to_ansi_fg(cell.fg));
                output.push_str(&color_to_ansi_bg(cell.bg));

                last_fg = cell.fg;
                last_bg = cell.bg;
                last_modifiers = cell.modifier;
            }

            output.push_str(cell.symbol());
        }
        output.push_str("\x1b[0m\n");
    }

    output
}

fn modifier_to_ansi(modifier: Modifier) -> String {
    const CODES: [(Modifier, &str); 6] = [
        (Modifier::BOLD, "\x1b[1m"),
        (Modifier::DIM, "\x1b[2m"),
        (Modifier::ITALIC, "\x1b[3m"),
        (Modifier::UNDERLINED, "\x1b[4m"),
        (Modifier::REVERSED, "\x1b[7m"),
        (Modifier::CROSSED_OUT, "\x1b[9m"),
    ];

    CODES
        .iter()
        .filter(|(flag, _)| modifier.contains(*flag))
        .map(|(_, code)| *code)
        .collect()
}

/// Convert ratatui Color to ANSI foreground escape sequence.
fn color_to_ansi_fg(color: Color) -> String {
    match color {
        Color::Reset => String::new(),
        Color::Rgb(r, g, b) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        Color::Indexed(i) => format!("\x1b[38;5;{}m", i),
        named => format!("\x1b[{}m", named_code(named, 30, 90)),
    }
}

/// Convert ratatui Color to ANSI background escape sequence.
fn color_to_ansi_bg(color: Color) -> String {
    match color {
        Color::Reset => String::new(),
        Color::Rgb(r, g, b) => format!("\x1b[48;2;{};{};{}m", r, g, b),
        Color::Indexed(i) => format!("\x1b[48;5;{}m", i),
        named => format!("\x1b[{}m", named_code(named, 40, 100)),
    }
}

/// SGR code of a named color, given the base of the normal and bright ranges.
fn named_code(color: Color, normal: u8, bright: u8) -> u8 {
    match color {
        Color::Black => normal,
        Color::Red => normal + 1,
        Color::Green => normal + 2,
        Color::Yellow => normal + 3,
        Color::Blue => normal + 4,
        Color::Magenta => normal + 5,
        Color::Cyan => normal + 6,
        Color::Gray => normal + 7,
        Color::DarkGray => bright,
        Color::LightRed => bright + 1,
        Color::LightGreen => bright + 2,
        Color::LightYellow => bright + 3,
        Color::LightBlue => bright + 4,
        Color::LightMagenta => bright + 5,
        Color::LightCyan => bright + 6,
        _ => bright + 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;
    use ratatui::widgets::Paragraph;

    #[test]
    fn test_plain_capture_rows() {
        let buffer = render_frame(6, 2, |frame| {
            frame.render_widget(Paragraph::new("ok"), frame.area());
        })
        .unwrap();
        assert_eq!(buffer_to_plain(&buffer), "ok    \n      \n");
    }

    #[test]
    fn test_ansi_capture_emits_truecolor() {
        let buffer = render_frame(4, 1, |frame| {
            frame.render_widget(
                Paragraph::new("hi").style(Style::default().fg(Color::Rgb(1, 2, 3))),
                frame.area(),
            );
        })
        .unwrap();
        let ansi = buffer_to_ansi(&buffer);
        assert!(ansi.contains("\x1b[38;2;1;2;3mhi"));
        assert!(ansi.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(color_to_ansi_fg(Color::Red), "\x1b[31m");
        assert_eq!(color_to_ansi_bg(Color::LightCyan), "\x1b[106m");
        assert_eq!(color_to_ansi_fg(Color::White), "\x1b[97m");
        assert_eq!(color_to_ansi_fg(Color::Reset), "");
    }
}
