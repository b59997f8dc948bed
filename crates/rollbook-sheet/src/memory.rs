use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{SheetError, SheetResult};
use crate::grid::Workbook;
use crate::range::RowRange;
use crate::traits::SheetBackend;

/// In-memory workbook.
///
/// Intended for tests and embedding. All worksheets are held behind a
/// `RwLock`; data is lost when the workbook is dropped.
pub struct InMemoryWorkbook {
    book: RwLock<Workbook>,
}

impl InMemoryWorkbook {
    /// Create a workbook with no worksheets.
    pub fn new() -> Self {
        Self::from_workbook(Workbook::new())
    }

    /// Wrap existing workbook data.
    pub fn from_workbook(book: Workbook) -> Self {
        Self {
            book: RwLock::new(book),
        }
    }

    /// Copy of the current workbook contents.
    pub fn snapshot(&self) -> SheetResult<Workbook> {
        Ok(self.read()?.clone())
    }

    /// Number of worksheets.
    pub fn len(&self) -> usize {
        self.read().map(|book| book.worksheets.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> SheetResult<RwLockReadGuard<'_, Workbook>> {
        self.book
            .read()
            .map_err(|e| SheetError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> SheetResult<RwLockWriteGuard<'_, Workbook>> {
        self.book
            .write()
            .map_err(|e| SheetError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetBackend for InMemoryWorkbook {
    fn has_worksheet(&self, title: &str) -> SheetResult<bool> {
        Ok(self.read()?.has_worksheet(title))
    }

    fn add_worksheet(&self, title: &str, rows: usize, cols: usize) -> SheetResult<()> {
        self.write()?.add_worksheet(title, rows, cols)
    }

    fn worksheet_titles(&self) -> SheetResult<Vec<String>> {
        Ok(self.read()?.titles())
    }

    fn row_values(&self, title: &str, row: usize) -> SheetResult<Vec<String>> {
        self.read()?.sheet(title)?.row_values(row)
    }

    fn all_values(&self, title: &str) -> SheetResult<Vec<Vec<String>>> {
        Ok(self.read()?.sheet(title)?.all_values())
    }

    fn append_row(&self, title: &str, values: &[String]) -> SheetResult<usize> {
        Ok(self.write()?.sheet_mut(title)?.append_row(values))
    }

    fn update_range(&self, title: &str, range: &RowRange, values: &[String]) -> SheetResult<()> {
        self.write()?.sheet_mut(title)?.update_range(range, values)
    }

    fn delete_row(&self, title: &str, row: usize) -> SheetResult<()> {
        self.write()?.sheet_mut(title)?.delete_row(row)
    }
}

impl std::fmt::Debug for InMemoryWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWorkbook")
            .field("worksheet_count", &self.len())
            .finish()
    }
}
