//! Table accessor: one worksheet treated as a header-addressed table.
//!
//! Row one holds the header, data starts at row two. The accessor never
//! caches the header or any row position; every call goes back to the
//! workbook, because deletes from other sessions shift rows at any time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rollbook_sheet::{RowRange, SharedBackend};
use rollbook_types::{Record, ID_COLUMN};

use crate::codec;
use crate::error::{StoreError, StoreResult};

/// Grid height given to newly created worksheets.
pub const NEW_SHEET_ROWS: usize = 1000;
/// Minimum grid width given to newly created worksheets.
pub const NEW_SHEET_MIN_COLS: usize = 10;

/// How strictly stored data is checked against the header.
///
/// `Lenient` keeps working with data that drifted from the declared shape
/// and logs every deviation: non-empty cells beyond the header are dropped
/// and a divergent header is left in place. `Strict` reports both as
/// errors. Missing trailing cells read as empty strings in either mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    #[default]
    Lenient,
    Strict,
}

/// 1-based position of a data row, valid only until the next mutation.
///
/// Neither `Clone` nor `Copy`: `replace_row` and `delete_row`
/// consume it, so a resolved position backs at most one mutation.
#[derive(Debug, PartialEq, Eq)]
pub struct RowPosition(usize);

impl RowPosition {
    /// The worksheet row number.
    pub fn get(&self) -> usize {
        self.0
    }
}

/// A worksheet bound to its declared header.
pub struct Table {
    backend: SharedBackend,
    name: String,
    declared: Vec<String>,
    validation: Validation,
}

impl Table {
    /// Bind `name`, creating the worksheet or its header row if missing.
    ///
    /// An existing non-empty header that differs from `header` is never
    /// rewritten: it is logged (lenient) or reported as
    /// [`StoreError::SchemaMismatch`] (strict), and the data is left as is.
    pub fn ensure(
        backend: SharedBackend,
        name: &str,
        header: &[&str],
        validation: Validation,
    ) -> StoreResult<Self> {
        let declared: Vec<String> = header.iter().map(|c| c.to_string()).collect();

        if !backend.has_worksheet(name)? {
            let cols = header.len().max(NEW_SHEET_MIN_COLS);
            backend.add_worksheet(name, NEW_SHEET_ROWS, cols)?;
            backend.append_row(name, &declared)?;
            info!(table = name, columns = header.len(), "created table");
        } else {
            let stored = backend.row_values(name, 1)?;
            if stored.is_empty() {
                if backend.all_values(name)?.is_empty() {
                    backend.append_row(name, &declared)?;
                } else {
                    backend.update_range(name, &RowRange::leading(1, declared.len()), &declared)?;
                }
                info!(table = name, "wrote missing header row");
            } else if stored != declared {
                match validation {
                    Validation::Lenient => warn!(
                        table = name,
                        expected = ?declared,
                        found = ?stored,
                        "stored header differs from declared schema; leaving it untouched"
                    ),
                    Validation::Strict => {
                        return Err(StoreError::SchemaMismatch {
                            table: name.to_string(),
                            expected: declared,
                            found: stored,
                        })
                    }
                }
            }
        }

        Ok(Self {
            backend,
            name: name.to_string(),
            declared,
            validation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// The stored header (row one).
    ///
    /// Fails with `SchemaMismatch` if the stored header has no `id` column,
    /// since no record in such a table can be addressed.
    pub fn headers(&self) -> StoreResult<Vec<String>> {
        debug!(table = %self.name, "reading header row");
        let header = self.backend.row_values(&self.name, 1)?;
        if !header.iter().any(|column| column == ID_COLUMN) {
            return Err(StoreError::SchemaMismatch {
                table: self.name.clone(),
                expected: self.declared.clone(),
                found: header,
            });
        }
        Ok(header)
    }

    /// Every data record in storage order. Fully blank rows are skipped.
    pub fn all_rows(&self) -> StoreResult<Vec<Record>> {
        let (header, rows) = self.scan()?;
        rows.into_iter()
            .filter(|(_, row)| !is_blank(row))
            .map(|(position, row)| self.decode(&header, position, &row))
            .collect()
    }

    /// Append one row of values aligned to the stored header.
    ///
    /// Returns the row number it landed on, for logging only.
    pub fn append(&self, values: &[String]) -> StoreResult<usize> {
        debug!(table = %self.name, cells = values.len(), "appending row");
        Ok(self.backend.append_row(&self.name, values)?)
    }

    /// Position of the first data row whose `id` cell equals `id`.
    ///
    /// Linear in the number of rows; the workbook offers no index.
    pub fn row_index_of(&self, id: &str) -> StoreResult<Option<RowPosition>> {
        Ok(self.locate(id)?.map(|(position, _)| position))
    }

    /// Position and decoded contents of the row carrying `id`.
    pub fn locate(&self, id: &str) -> StoreResult<Option<(RowPosition, Record)>> {
        let (header, rows) = self.scan()?;
        let Some(id_col) = header.iter().position(|column| column == ID_COLUMN) else {
            return Ok(None);
        };
        for (position, row) in rows {
            if row.get(id_col).map(String::as_str) == Some(id) {
                let record = self.decode(&header, position, &row)?;
                return Ok(Some((RowPosition(position), record)));
            }
        }
        Ok(None)
    }

    /// Re-read the row at `position` and decode it against `header`.
    pub fn read_row(&self, header: &[String], position: &RowPosition) -> StoreResult<Record> {
        debug!(table = %self.name, row = position.0, "reading row");
        let row = self.backend.row_values(&self.name, position.0)?;
        self.decode(header, position.0, &row)
    }

    /// Overwrite the row at `position` with `values`, leaving all other rows
    /// untouched.
    pub fn replace_row(&self, position: RowPosition, values: &[String]) -> StoreResult<()> {
        let range = RowRange::leading(position.0, values.len());
        debug!(table = %self.name, range = %range, "replacing row");
        self.backend.update_range(&self.name, &range, values)?;
        Ok(())
    }

    /// Remove the row at `position`. Every later row moves up by one.
    pub fn delete_row(&self, position: RowPosition) -> StoreResult<()> {
        debug!(table = %self.name, row = position.0, "deleting row");
        self.backend.delete_row(&self.name, position.0)?;
        Ok(())
    }

    /// Header plus numbered data rows, from a single read.
    fn scan(&self) -> StoreResult<(Vec<String>, Vec<(usize, Vec<String>)>)> {
        debug!(table = %self.name, "scanning rows");
        let mut values = self.backend.all_values(&self.name)?.into_iter();
        let header = trim_trailing(values.next().unwrap_or_default());
        let rows = values.enumerate().map(|(i, row)| (i + 2, row)).collect();
        Ok((header, rows))
    }

    /// Decode one row. Missing trailing cells read as empty strings: the
    /// backend trims them from `row_values` and pads `all_values` to the
    /// widest row, so a short row cannot be told apart from blank trailing
    /// fields. Only non-empty cells beyond the header count as drift.
    fn decode(&self, header: &[String], position: usize, row: &[String]) -> StoreResult<Record> {
        let surplus = codec::surplus_cells(header, row);
        if surplus > 0 {
            match self.validation {
                Validation::Strict => {
                    return Err(StoreError::RowShape {
                        table: self.name.clone(),
                        row: position,
                        expected: header.len(),
                        actual: header.len() + surplus,
                    })
                }
                Validation::Lenient => warn!(
                    table = %self.name,
                    row = position,
                    surplus,
                    "ignoring cells beyond the header"
                ),
            }
        }
        Ok(codec::to_record(header, row))
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("validation", &self.validation)
            .finish()
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

fn trim_trailing(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rollbook_sheet::{InMemoryWorkbook, SheetBackend};

    const HEADER: &[&str] = &["id", "name", "level"];

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn setup() -> (Arc<InMemoryWorkbook>, Table) {
        let book = Arc::new(InMemoryWorkbook::new());
        let table = Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        (book, table)
    }

    #[test]
    fn ensure_creates_sheet_with_header() {
        let (book, table) = setup();
        assert_eq!(book.row_values("Classes", 1).unwrap(), strings(HEADER));
        assert_eq!(table.headers().unwrap(), strings(HEADER));
        let snap = book.snapshot().unwrap();
        let sheet = snap.sheet("Classes").unwrap();
        assert_eq!(sheet.rows, NEW_SHEET_ROWS);
        assert_eq!(sheet.cols, NEW_SHEET_MIN_COLS);
    }

    #[test]
    fn ensure_twice_writes_one_header() {
        let (book, _) = setup();
        Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        assert_eq!(book.all_values("Classes").unwrap(), vec![strings(HEADER)]);
    }

    #[test]
    fn ensure_fills_empty_header_on_existing_sheet() {
        let book = Arc::new(InMemoryWorkbook::new());
        book.add_worksheet("Classes", 50, 5).unwrap();
        Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        assert_eq!(book.all_values("Classes").unwrap(), vec![strings(HEADER)]);
    }

    #[test]
    fn ensure_writes_header_above_existing_data() {
        let book = Arc::new(InMemoryWorkbook::new());
        book.add_worksheet("Classes", 50, 5).unwrap();
        book.update_range("Classes", &RowRange::leading(2, 3), &strings(&["c1", "Flamenco I", "beginner"]))
            .unwrap();
        let table = Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        assert_eq!(book.row_values("Classes", 1).unwrap(), strings(HEADER));
        assert_eq!(table.all_rows().unwrap().len(), 1);
    }

    #[test]
    fn ensure_leaves_divergent_header_untouched() {
        let book = Arc::new(InMemoryWorkbook::new());
        book.add_worksheet("Classes", 50, 5).unwrap();
        book.append_row("Classes", &strings(&["id", "title"])).unwrap();
        book.append_row("Classes", &strings(&["c1", "Sevillanas"])).unwrap();
        let before = book.snapshot().unwrap();

        Table::ensure(book.clone(), "Classes", HEADER, Validation::Lenient).unwrap();
        assert_eq!(book.snapshot().unwrap(), before);

        let err = Table::ensure(book.clone(), "Classes", HEADER, Validation::Strict).unwrap_err();
        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert_eq!(book.snapshot().unwrap(), before);
    }

    #[test]
    fn divergent_header_still_decodes_by_column_name() {
        let book = Arc::new(InMemoryWorkbook::new());
        book.add_worksheet("Classes", 50, 5).unwrap();
        book.append_row("Classes", &strings(&["id", "level", "name"])).unwrap();
        book.append_row("Classes", &strings(&["c1", "advanced", "Bulerías"])).unwrap();
        let table = Table::ensure(book, "Classes", HEADER, Validation::Lenient).unwrap();
        let rows = table.all_rows().unwrap();
        assert_eq!(rows[0].get("name"), Some("Bulerías"));
        assert_eq!(rows[0].get("level"), Some("advanced"));
    }

    #[test]
    fn all_rows_skips_blank_rows_but_keeps_positions() {
        let (book, table) = setup();
        table.append(&strings(&["c1", "A", "x"])).unwrap();
        table.append(&strings(&["c2", "B", "y"])).unwrap();
        book.update_range("Classes", &RowRange::leading(2, 3), &strings(&["", "", ""]))
            .unwrap();

        let rows = table.all_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some("c2"));
        assert_eq!(table.row_index_of("c2").unwrap().map(|p| p.get()), Some(3));
    }

    #[test]
    fn row_index_of_finds_first_match() {
        let (_, table) = setup();
        table.append(&strings(&["c1", "A", ""])).unwrap();
        table.append(&strings(&["c2", "B", ""])).unwrap();
        table.append(&strings(&["c2", "dup", ""])).unwrap();
        assert_eq!(table.row_index_of("c2").unwrap(), Some(RowPosition(3)));
        assert_eq!(table.row_index_of("zz").unwrap(), None);
    }

    #[test]
    fn header_is_never_matched_as_data() {
        let (_, table) = setup();
        assert_eq!(table.row_index_of("id").unwrap(), None);
    }

    #[test]
    fn surplus_cells_are_dropped_when_lenient_and_rejected_when_strict() {
        let (book, table) = setup();
        book.append_row("Classes", &strings(&["c1", "A", "x", "stray"])).unwrap();
        let rows = table.all_rows().unwrap();
        assert_eq!(rows[0].len(), 3);
        assert!(!rows[0].iter().any(|(_, v)| v == "stray"));

        let strict = Table::ensure(book, "Classes", HEADER, Validation::Strict).unwrap();
        let err = strict.all_rows().unwrap_err();
        assert!(matches!(err, StoreError::RowShape { row: 2, expected: 3, actual: 4, .. }));
    }

    #[test]
    fn replace_row_overwrites_only_that_row() {
        let (_, table) = setup();
        table.append(&strings(&["c1", "A", "x"])).unwrap();
        table.append(&strings(&["c2", "B", "y"])).unwrap();
        let pos = table.row_index_of("c1").unwrap().unwrap();
        table.replace_row(pos, &strings(&["c1", "A2", "x2"])).unwrap();
        let rows = table.all_rows().unwrap();
        assert_eq!(rows[0].get("name"), Some("A2"));
        assert_eq!(rows[1].get("name"), Some("B"));
    }

    #[test]
    fn delete_row_shifts_later_rows() {
        let (_, table) = setup();
        for id in ["c1", "c2", "c3"] {
            table.append(&strings(&[id, "n", "l"])).unwrap();
        }
        let pos = table.row_index_of("c1").unwrap().unwrap();
        table.delete_row(pos).unwrap();
        assert_eq!(table.row_index_of("c3").unwrap().map(|p| p.get()), Some(3));
        assert_eq!(table.all_rows().unwrap().len(), 2);
    }

    #[test]
    fn read_row_pads_trimmed_trailing_cells() {
        let (_, table) = setup();
        table.append(&strings(&["c1", "A", ""])).unwrap();
        let header = table.headers().unwrap();
        let pos = table.row_index_of("c1").unwrap().unwrap();
        let record = table.read_row(&header, &pos).unwrap();
        assert_eq!(record.get("level"), Some(""));
    }

    #[test]
    fn blank_trailing_cells_read_as_empty_in_strict_mode() {
        let (book, _) = setup();
        book.append_row("Classes", &strings(&["c1", "A"])).unwrap();
        let strict = Table::ensure(book, "Classes", HEADER, Validation::Strict).unwrap();

        let rows = strict.all_rows().unwrap();
        assert_eq!(rows[0].get("level"), Some(""));

        let header = strict.headers().unwrap();
        let pos = strict.row_index_of("c1").unwrap().unwrap();
        let record = strict.read_row(&header, &pos).unwrap();
        assert_eq!(record.get("name"), Some("A"));
        assert_eq!(record.get("level"), Some(""));
    }

    #[test]
    fn headers_without_id_column_are_rejected() {
        let book = Arc::new(InMemoryWorkbook::new());
        book.add_worksheet("Classes", 50, 5).unwrap();
        book.append_row("Classes", &strings(&["code", "name"])).unwrap();
        let table = Table::ensure(book, "Classes", HEADER, Validation::Lenient).unwrap();
        assert!(matches!(table.headers(), Err(StoreError::SchemaMismatch { .. })));
        assert_eq!(table.row_index_of("anything").unwrap(), None);
    }

    #[test]
    fn validation_serde_names() {
        assert_eq!(serde_json::to_string(&Validation::Strict).unwrap(), "\"strict\"");
        assert_eq!(Validation::default(), Validation::Lenient);
    }
}
