//! Terminal rendering with ratatui.
//!
//! Nothing here mutates [`App`]; every function paints what the state holds.

pub mod common;
pub mod detail;
pub mod table;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Page};

/// Minimum terminal size for usable display.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 12;

/// Paint one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, area.height.saturating_sub(5) / 2, area.width, 5);
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Search input
        Constraint::Min(6),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_search(frame, app, chunks[1]);

    match (app.page, app.topic.as_ref()) {
        (Page::Topic, Some(topic)) => table::render(frame, &topic.table, &app.theme, chunks[2]),
        _ => table::render(frame, &app.main_table, &app.theme, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if let Some(message) = app.topic.as_ref().and_then(|t| t.detail.as_ref()) {
        detail::render_overlay(frame, message, &app.theme, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
    if let Some(text) = &app.modal {
        common::render_modal(frame, text, &app.theme, area);
    }
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
