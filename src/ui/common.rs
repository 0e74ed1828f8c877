//! Common UI components shared across pages.
//!
//! This module contains the header bar, search line, status bar, help
//! overlay and the modal.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Page};
use crate::data::duration::format_duration;
use crate::resource::ResourceKind;
use crate::ui::Theme;

/// Render the header bar: context, active resource or topic, poll interval.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" KAFKALENS ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ ctx "),
        Span::styled(app.current_context(), Style::default().fg(app.theme.current)),
        Span::raw(" │ "),
    ];

    match (app.page, app.topic.as_ref()) {
        (Page::Topic, Some(topic)) => {
            let flags = topic.stream.flags();
            spans.push(Span::styled(topic.stream.topic().to_string(), app.theme.label_active));
            spans.push(Span::raw(format!(
                " │ {} tail {}{} │ {} cached",
                flags.offset_policy,
                flags.tail,
                if flags.follow { " follow" } else { "" },
                topic.total,
            )));
            let filter = topic.stream.filter();
            if !filter.is_empty() {
                spans.push(Span::raw(format!(" │ /{}/", filter)));
            }
        }
        _ => {
            spans.push(Span::styled(app.resource.name(), app.theme.label_active));
            spans.push(Span::styled(
                format!(" every {}", format_duration(app.poll_interval)),
                app.theme.label_inactive,
            ));
            if !app.filter.is_empty() {
                spans.push(Span::raw(format!(" │ /{}/", app.filter)));
            }
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the search line.
///
/// On the topic page this is the inline filter; elsewhere the resource or
/// table search, followed by autocomplete suggestions.
pub fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(topic) = app.topic.as_ref().filter(|_| app.page == Page::Topic) {
        let line = match &topic.search {
            Some(text) => Line::from(vec![
                Span::styled(" / ", app.theme.input_style(true)),
                Span::raw(format!("{}_", text)),
            ]),
            None => Line::from(Span::styled(
                " /:filter o:offset c:copy Enter:detail Esc:back",
                app.theme.input_style(false),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let search = &app.search;
    let line = if search.is_focused() {
        let mut spans = vec![
            Span::styled(format!(" {} ", search.label()), app.theme.input_style(true)),
            Span::raw(format!("{}_", search.input())),
        ];
        let suggestions = search.suggestions();
        if !suggestions.is_empty() {
            spans.push(Span::styled(
                format!("   Tab: {}", suggestions.join(" ")),
                app.theme.label_inactive,
            ));
        }
        Line::from(spans)
    } else {
        let hint = match app.resource.kind() {
            ResourceKind::Topics => " :resource /filter Enter:open c:copy ?:help",
            ResourceKind::Contexts => " :resource /filter Enter:switch c:copy ?:help",
            ResourceKind::ConsumerGroups => " :resource /filter c:copy ?:help",
        };
        Line::from(Span::styled(hint, app.theme.input_style(false)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.status.current() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let table = app.active_table();
    let position = match table.selected_row() {
        0 => String::new(),
        row => format!(" [{}/{}]", row, table.data_row_count()),
    };
    let paragraph = Paragraph::new(format!(" {}{} | Ctrl-C:quit", table.title(), position))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Move selection"),
        Line::from("  PgUp/PgDn   Jump 10 rows"),
        Line::from("  g/G         Top/bottom"),
        Line::from("  Enter       Open topic / switch context"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Search"),
        Line::from("  :           Switch resource (topics, ctx, cgs)"),
        Line::from("  /           Filter rows"),
        Line::from("  Tab         Accept suggestion"),
        Line::from("  :q          Quit"),
        Line::from(""),
        section(" Topic page"),
        Line::from("  o           Toggle earliest/latest"),
        Line::from("  Enter       Message detail"),
        Line::from("  c           Copy selected row"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = crate::ui::centered(area, 48, 24);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// Render a modal message box.
pub fn render_modal(frame: &mut Frame, text: &str, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.error));

    let lines = vec![
        Line::from(""),
        Line::from(format!(" {}", text)),
        Line::from(""),
        Line::from(Span::styled(" Enter/Esc:close", Style::default().add_modifier(Modifier::DIM))),
    ];

    let modal_area = crate::ui::centered(area, 50, 7);
    frame.render_widget(Clear, modal_area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        modal_area,
    );
}
