//! Color palette for the terminal monitor.

/// High contrast color palette for better visibility.
pub mod colors {
    use ratatui::style::Color;

    // Variants
    pub const SUCCESS: Color = Color::Rgb(0, 220, 120); // Green
    pub const WARNING: Color = Color::Rgb(255, 200, 0); // Amber
    pub const ERROR: Color = Color::Rgb(255, 80, 80); // Red
    pub const INFO: Color = Color::Rgb(0, 200, 255); // Cyan
    pub const MUTED: Color = Color::Rgb(110, 110, 140); // Grey-blue
    pub const TEXT: Color = Color::Rgb(220, 220, 230);

    // Chrome
    pub const BORDER: Color = Color::Rgb(80, 80, 120);
    pub const TITLE: Color = Color::Rgb(0, 200, 255);
    pub const HELP_KEY: Color = Color::Rgb(255, 200, 0);
    pub const BANNER_BG: Color = Color::Rgb(70, 50, 0);
    pub const UPDATING: Color = Color::Rgb(255, 50, 50);
}
