//! Message detail overlay.
//!
//! Shows one message in full: position, schema ids, key, headers and the
//! value, pretty-printed when it parses as JSON.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use kafkalens_types::ConsumedMessage;

use crate::ui::Theme;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// The value as shown in the overlay.
pub fn format_value(value: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) if json.is_object() || json.is_array() => {
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| value.to_string())
        }
        _ => value.to_string(),
    }
}

fn field<'a>(name: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::raw(format!(" {}: ", name)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn schema(id: Option<i32>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn render_overlay(frame: &mut Frame, message: &ConsumedMessage, theme: &Theme, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 120);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);
    let overlay_area = crate::ui::centered(area, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let header_height = 4 + message.headers.len().min(6) as u16;
    let chunks = Layout::vertical([
        Constraint::Length(header_height + 2),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(overlay_area);

    let mut lines = vec![
        Line::from(vec![
            Span::raw(" Partition: "),
            Span::styled(message.partition.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("    Offset: "),
            Span::styled(message.offset.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::raw(" Key schema: "),
            Span::raw(schema(message.key_schema_id)),
            Span::raw("    Value schema: "),
            Span::raw(schema(message.value_schema_id)),
        ]),
        field("Key", message.key.clone()),
        field(
            "Timestamp",
            message
                .timestamp_ms
                .map(|ts| format!("{} ms", ts))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];
    for header in message.headers.iter().take(6) {
        lines.push(Line::from(format!("  {} = {}", header.key, header.value)));
    }

    let header = Paragraph::new(lines).block(
        Block::default()
            .title(" Message ")
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    let value = Paragraph::new(format_value(&message.value))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Value ")
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(value, chunks[1]);

    let footer = Paragraph::new(" Esc/Enter:close ").style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_pretty_prints_json() {
        assert_eq!(format_value(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_format_value_leaves_text_alone() {
        assert_eq!(format_value("plain text"), "plain text");
        assert_eq!(format_value("42"), "42");
    }
}
