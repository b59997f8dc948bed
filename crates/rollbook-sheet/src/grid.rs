//! Worksheet grid semantics shared by the bundled backends.
//!
//! [`Workbook`] is plain data (serializable, no locking); the backends wrap
//! it with their own synchronization and persistence.

use serde::{Deserialize, Serialize};

use crate::error::{SheetError, SheetResult};
use crate::range::RowRange;

/// One worksheet: a grid size plus the cells written so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    pub title: String,
    /// Grid height. Appends past it grow the grid.
    pub rows: usize,
    /// Grid width. Appends past it grow the grid.
    pub cols: usize,
    /// Written rows, index 0 = row 1. Rows may be ragged.
    #[serde(default)]
    pub cells: Vec<Vec<String>>,
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

fn trimmed(row: &[String]) -> Vec<String> {
    let used = row.iter().rposition(|cell| !cell.is_empty()).map_or(0, |i| i + 1);
    row[..used].to_vec()
}

impl Worksheet {
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            title: title.into(),
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    /// Number of the last row holding a non-empty cell (0 when blank).
    pub fn used_rows(&self) -> usize {
        self.cells.iter().rposition(|row| !is_blank(row)).map_or(0, |i| i + 1)
    }

    pub fn row_values(&self, row: usize) -> SheetResult<Vec<String>> {
        if row == 0 {
            return Err(self.row_out_of_range(row));
        }
        Ok(self
            .cells
            .get(row - 1)
            .map(|cells| trimmed(cells))
            .unwrap_or_default())
    }

    pub fn all_values(&self) -> Vec<Vec<String>> {
        let used: Vec<Vec<String>> = self.cells[..self.used_rows()]
            .iter()
            .map(|row| trimmed(row))
            .collect();
        let width = used.iter().map(Vec::len).max().unwrap_or(0);
        used.into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect()
    }

    pub fn append_row(&mut self, values: &[String]) -> usize {
        let target = self.used_rows() + 1;
        self.cells.truncate(target - 1);
        self.cells.push(values.to_vec());
        self.rows = self.rows.max(target);
        self.cols = self.cols.max(values.len());
        target
    }

    pub fn update_range(&mut self, range: &RowRange, values: &[String]) -> SheetResult<()> {
        if values.len() != range.width() {
            return Err(SheetError::WidthMismatch {
                range: range.to_a1(),
                expected: range.width(),
                actual: values.len(),
            });
        }
        if range.row == 0 || range.first_col == 0 || range.row > self.rows || range.last_col > self.cols {
            return Err(SheetError::RangeOutOfBounds {
                title: self.title.clone(),
                range: range.to_a1(),
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.cells.len() < range.row {
            self.cells.resize(range.row, Vec::new());
        }
        let row = &mut self.cells[range.row - 1];
        if row.len() < range.last_col {
            row.resize(range.last_col, String::new());
        }
        row[range.first_col - 1..range.last_col].clone_from_slice(values);
        Ok(())
    }

    pub fn delete_row(&mut self, row: usize) -> SheetResult<()> {
        if row == 0 || row > self.rows {
            return Err(self.row_out_of_range(row));
        }
        if self.rows == 1 {
            return Err(SheetError::InvalidGridSize { rows: 0, cols: self.cols });
        }
        if row <= self.cells.len() {
            self.cells.remove(row - 1);
        }
        self.rows -= 1;
        Ok(())
    }

    fn row_out_of_range(&self, row: usize) -> SheetError {
        SheetError::RowOutOfRange {
            title: self.title.clone(),
            row,
            rows: self.rows,
        }
    }
}

/// A set of worksheets in creation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_worksheet(&self, title: &str) -> bool {
        self.worksheets.iter().any(|ws| ws.title == title)
    }

    pub fn add_worksheet(&mut self, title: &str, rows: usize, cols: usize) -> SheetResult<()> {
        if rows == 0 || cols == 0 {
            return Err(SheetError::InvalidGridSize { rows, cols });
        }
        if self.has_worksheet(title) {
            return Err(SheetError::WorksheetExists(title.to_string()));
        }
        self.worksheets.push(Worksheet::new(title, rows, cols));
        Ok(())
    }

    pub fn titles(&self) -> Vec<String> {
        self.worksheets.iter().map(|ws| ws.title.clone()).collect()
    }

    pub fn sheet(&self, title: &str) -> SheetResult<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.title == title)
            .ok_or_else(|| SheetError::WorksheetNotFound(title.to_string()))
    }

    pub fn sheet_mut(&mut self, title: &str) -> SheetResult<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|ws| ws.title == title)
            .ok_or_else(|| SheetError::WorksheetNotFound(title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sheet_with(rows: &[&[&str]]) -> Worksheet {
        let mut ws = Worksheet::new("T", 100, 10);
        for row in rows {
            ws.append_row(&strings(row));
        }
        ws
    }

    #[test]
    fn append_targets_first_row_of_blank_sheet() {
        let mut ws = Worksheet::new("T", 100, 10);
        assert_eq!(ws.append_row(&strings(&["id", "name"])), 1);
        assert_eq!(ws.append_row(&strings(&["1", "Ana"])), 2);
        assert_eq!(ws.used_rows(), 2);
    }

    #[test]
    fn append_skips_over_trailing_blank_rows() {
        let mut ws = sheet_with(&[&["id"], &["1"]]);
        ws.cells.push(strings(&["", ""]));
        assert_eq!(ws.append_row(&strings(&["2"])), 3);
        assert_eq!(ws.all_values().len(), 3);
    }

    #[test]
    fn append_grows_grid() {
        let mut ws = Worksheet::new("T", 1, 2);
        ws.append_row(&strings(&["a", "b", "c"]));
        ws.append_row(&strings(&["d"]));
        assert_eq!(ws.rows, 2);
        assert_eq!(ws.cols, 3);
    }

    #[test]
    fn row_values_trims_trailing_empties() {
        let ws = sheet_with(&[&["id", "name", ""], &["1", "", ""]]);
        assert_eq!(ws.row_values(1).unwrap(), strings(&["id", "name"]));
        assert_eq!(ws.row_values(2).unwrap(), strings(&["1"]));
        assert!(ws.row_values(50).unwrap().is_empty());
        assert!(ws.row_values(0).is_err());
    }

    #[test]
    fn all_values_pads_to_widest_row() {
        let ws = sheet_with(&[&["id", "name", "email"], &["1"]]);
        assert_eq!(
            ws.all_values(),
            vec![strings(&["id", "name", "email"]), strings(&["1", "", ""])]
        );
    }

    #[test]
    fn update_range_overwrites_one_row() {
        let mut ws = sheet_with(&[&["id", "name"], &["1", "Ana"], &["2", "Bia"]]);
        ws.update_range(&RowRange::leading(2, 2), &strings(&["1", "Ana Maria"]))
            .unwrap();
        assert_eq!(ws.row_values(2).unwrap(), strings(&["1", "Ana Maria"]));
        assert_eq!(ws.row_values(3).unwrap(), strings(&["2", "Bia"]));
    }

    #[test]
    fn update_range_rejects_width_mismatch() {
        let mut ws = sheet_with(&[&["id", "name"]]);
        let err = ws
            .update_range(&RowRange::leading(1, 2), &strings(&["only-one"]))
            .unwrap_err();
        assert!(matches!(err, SheetError::WidthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn update_range_rejects_out_of_grid() {
        let mut ws = Worksheet::new("T", 3, 2);
        let err = ws
            .update_range(&RowRange::leading(2, 3), &strings(&["a", "b", "c"]))
            .unwrap_err();
        assert!(matches!(err, SheetError::RangeOutOfBounds { .. }));
    }

    #[test]
    fn delete_row_shifts_later_rows_up() {
        let mut ws = sheet_with(&[&["id"], &["1"], &["2"], &["3"]]);
        ws.delete_row(2).unwrap();
        assert_eq!(
            ws.all_values(),
            vec![strings(&["id"]), strings(&["2"]), strings(&["3"])]
        );
        assert_eq!(ws.rows, 99);
    }

    #[test]
    fn delete_row_beyond_grid_fails() {
        let mut ws = Worksheet::new("T", 2, 2);
        assert!(matches!(ws.delete_row(3), Err(SheetError::RowOutOfRange { .. })));
    }

    #[test]
    fn workbook_rejects_duplicate_titles_and_empty_grids() {
        let mut wb = Workbook::new();
        wb.add_worksheet("A", 10, 10).unwrap();
        assert!(matches!(wb.add_worksheet("A", 10, 10), Err(SheetError::WorksheetExists(_))));
        assert!(matches!(wb.add_worksheet("B", 0, 10), Err(SheetError::InvalidGridSize { .. })));
        assert!(matches!(wb.sheet("C"), Err(SheetError::WorksheetNotFound(_))));
        assert_eq!(wb.titles(), vec!["A".to_string()]);
    }
}
