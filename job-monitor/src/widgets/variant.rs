use ratatui::style::{Color, Style};

use crate::theme::colors;

/// Visual classification of a value. Selects a color and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    #[default]
    Default,
    Success,
    Warning,
    Error,
    Info,
    Muted,
}

impl Variant {
    pub fn color(self) -> Color {
        match self {
            Self::Default => colors::TEXT,
            Self::Success => colors::SUCCESS,
            Self::Warning => colors::WARNING,
            Self::Error => colors::ERROR,
            Self::Info => colors::INFO,
            Self::Muted => colors::MUTED,
        }
    }

    pub fn style(self) -> Style {
        Style::default().fg(self.color())
    }
}
