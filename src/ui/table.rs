//! Paints a [`TableModel`].

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::ui::Theme;
use crate::view::TableModel;

/// Column widths: the first and last columns take the spare room.
fn widths(columns: usize) -> Vec<Constraint> {
    (0..columns)
        .map(|i| {
            if i == 0 || (columns > 2 && i == columns - 1) {
                Constraint::Fill(3)
            } else {
                Constraint::Fill(1)
            }
        })
        .collect()
}

pub fn render(frame: &mut Frame, model: &TableModel, theme: &Theme, area: Rect) {
    let header = Row::new(model.header().iter().map(|h| Cell::from(h.clone())))
        .height(1)
        .style(theme.header);

    let rows: Vec<Row> = model
        .data_rows()
        .iter()
        .map(|cells| {
            Row::new(
                cells
                    .iter()
                    .map(|c| Cell::from(c.clone()).style(theme.cell_style(c))),
            )
        })
        .collect();

    let table = Table::new(rows, widths(model.header().len()))
        .header(header)
        .block(
            Block::default()
                .title(format!(" {} ", model.title()))
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border)),
        )
        .row_highlight_style(theme.selected)
        .highlight_symbol("▶ ");

    // TableState indexes data rows; the model counts the header as row 0.
    let mut state = TableState::default();
    match model.selected_row() {
        0 => state.select(None),
        row => state.select(Some(row - 1)),
    }
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_favor_first_and_last() {
        assert_eq!(widths(2), vec![Constraint::Fill(3), Constraint::Fill(1)]);
        assert_eq!(
            widths(4),
            vec![
                Constraint::Fill(3),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(3)
            ]
        );
    }
}
