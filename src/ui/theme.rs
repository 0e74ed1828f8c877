//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for notifications that report a failure.
    pub warning: Color,
    /// Color for modal borders and fatal messages.
    pub error: Color,
    /// Color for the current context marker.
    pub current: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active resource or page label.
    pub label_active: Style,
    /// Style for secondary labels.
    pub label_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            error: Color::Red,
            current: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            label_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            label_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            error: Color::Red,
            current: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            label_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            label_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the search prompt while it has focus.
    pub fn input_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    /// Style for a table cell whose text carries a state.
    ///
    /// The current-context marker and consumer group states are coloured;
    /// every other cell uses the row style.
    pub fn cell_style(&self, text: &str) -> Style {
        match text {
            "*" => Style::default().fg(self.current).add_modifier(Modifier::BOLD),
            "Dead" => Style::default().fg(self.error),
            "Empty" | "PreparingRebalance" | "CompletingRebalance" => {
                Style::default().fg(self.warning)
            }
            _ => Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_style_colours_states() {
        let theme = Theme::dark();
        assert_eq!(theme.cell_style("*").fg, Some(theme.current));
        assert_eq!(theme.cell_style("Dead").fg, Some(theme.error));
        assert_eq!(theme.cell_style("Empty").fg, Some(theme.warning));
        assert_eq!(theme.cell_style("Stable"), Style::default());
        assert_eq!(theme.cell_style("orders"), Style::default());
    }
}
