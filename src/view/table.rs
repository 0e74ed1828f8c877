//! Table model backing every table in the UI.
//!
//! Row 0 is the header row; data rows start at 1. Selection uses the same
//! indexing, so a selection of 0 means "header selected".

use thiserror::Error;

/// Returned when the selected row cannot be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Copy: Invalid row selection")]
pub struct InvalidSelection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    title: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    selected: usize,
    scroll: usize,
}

impl TableModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove header and data rows. Title and selection are kept.
    pub fn clear(&mut self) {
        self.header.clear();
        self.rows.clear();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_header_row<S: AsRef<str>>(&mut self, cells: &[S]) {
        self.header = cells.iter().map(|c| c.as_ref().to_string()).collect();
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Set table row `index` (1-based; row 0 is the header).
    pub fn set_data_row(&mut self, index: usize, cells: Vec<String>) {
        if index == 0 {
            self.header = cells;
            return;
        }
        let slot = index - 1;
        if self.rows.len() <= slot {
            self.rows.resize_with(slot + 1, Vec::new);
        }
        self.rows[slot] = cells;
    }

    /// Append a data row after the last one.
    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows including the header row.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn select_row(&mut self, index: usize) {
        self.selected = index;
    }

    pub fn selected_row(&self) -> usize {
        self.selected
    }

    /// Cells of the selected data row, if a data row is selected.
    pub fn selected_cells(&self) -> Option<&[String]> {
        if self.selected == 0 {
            return None;
        }
        self.rows.get(self.selected - 1).map(Vec::as_slice)
    }

    /// Keep the selection on a data row when there is one.
    pub fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.clamp(1, self.rows.len());
        }
    }

    pub fn select_next(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.rows.len());
        if self.selected == 0 && !self.rows.is_empty() {
            self.selected = 1;
        }
    }

    pub fn select_prev(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n).max(1).min(self.rows.len());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.selected = usize::from(!self.rows.is_empty());
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = self.rows.len().saturating_sub(1);
        self.selected = self.rows.len();
    }

    /// First data row the painter should try to show.
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// The selected row as comma-joined cell text.
    pub fn selection_csv(&self) -> Result<String, InvalidSelection> {
        self.selected_cells()
            .map(|cells| cells.join(","))
            .ok_or(InvalidSelection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(rows: usize) -> TableModel {
        let mut table = TableModel::new();
        table.set_header_row(&["Name", "Count"]);
        for i in 0..rows {
            table.push_row(vec![format!("row-{}", i), i.to_string()]);
        }
        table
    }

    #[test]
    fn header_only_selection_is_invalid() {
        let mut table = table_with(0);
        table.select_row(0);
        let err = table.selection_csv().unwrap_err();
        assert_eq!(err.to_string(), "Copy: Invalid row selection");
    }

    #[test]
    fn out_of_range_selection_is_invalid() {
        let mut table = table_with(2);
        table.select_row(3);
        assert_eq!(table.selection_csv(), Err(InvalidSelection));
    }

    #[test]
    fn selection_is_joined_as_csv() {
        let mut table = table_with(2);
        table.select_row(2);
        assert_eq!(table.selection_csv().unwrap(), "row-1,1");
    }

    #[test]
    fn set_data_row_pads_missing_rows() {
        let mut table = table_with(0);
        table.set_data_row(3, vec!["c".into()]);
        assert_eq!(table.data_row_count(), 3);
        assert!(table.data_rows()[0].is_empty());
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn scroll_to_end_selects_last_row() {
        let mut table = table_with(5);
        table.scroll_to_end();
        assert_eq!(table.selected_row(), 5);
        table.scroll_to_top();
        assert_eq!(table.selected_row(), 1);
    }

    #[test]
    fn navigation_stays_on_data_rows() {
        let mut table = table_with(3);
        table.select_row(0);
        table.select_next(1);
        assert_eq!(table.selected_row(), 1);
        table.select_next(10);
        assert_eq!(table.selected_row(), 3);
        table.select_prev(10);
        assert_eq!(table.selected_row(), 1);
    }

    #[test]
    fn clamp_selection_after_shrink() {
        let mut table = table_with(5);
        table.select_row(5);
        table.clear();
        table.push_row(vec!["only".into()]);
        table.clamp_selection();
        assert_eq!(table.selected_row(), 1);
    }
}
