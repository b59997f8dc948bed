use std::sync::Arc;

use crate::error::SheetResult;
use crate::range::RowRange;

/// Row-level access to a workbook of named worksheets.
///
/// All implementations must satisfy these invariants:
/// - Rows and columns are 1-based. Row 1 is an ordinary row; the record
///   layer reserves it for headers.
/// - `append_row` writes after the last row holding any non-empty cell and
///   either writes the whole row or fails.
/// - `delete_row` shifts every later row up by one. Row numbers obtained
///   before a delete are stale afterwards.
/// - Reads reflect every write issued earlier through the same backend.
/// - All I/O errors are propagated, never silently ignored.
pub trait SheetBackend: Send + Sync {
    /// Whether a worksheet with this title exists.
    fn has_worksheet(&self, title: &str) -> SheetResult<bool>;

    /// Create an empty worksheet with a `rows` x `cols` grid.
    ///
    /// Fails with `WorksheetExists` if the title is taken.
    fn add_worksheet(&self, title: &str, rows: usize, cols: usize) -> SheetResult<()>;

    /// Titles of all worksheets, in creation order.
    fn worksheet_titles(&self) -> SheetResult<Vec<String>>;

    /// Values of one row with trailing empty cells dropped.
    ///
    /// A row past the last used row yields an empty vector.
    fn row_values(&self, title: &str, row: usize) -> SheetResult<Vec<String>>;

    /// Every used row, starting at row 1.
    ///
    /// Trailing empty rows are dropped. Each returned row is padded with
    /// empty strings to the width of the widest used row.
    fn all_values(&self, title: &str) -> SheetResult<Vec<Vec<String>>>;

    /// Append one row after the last used row. Returns the row number written.
    fn append_row(&self, title: &str, values: &[String]) -> SheetResult<usize>;

    /// Overwrite the cells of `range` with `values`.
    ///
    /// `values.len()` must equal `range.width()`.
    fn update_range(&self, title: &str, range: &RowRange, values: &[String]) -> SheetResult<()>;

    /// Remove one row, shifting later rows up.
    fn delete_row(&self, title: &str, row: usize) -> SheetResult<()>;
}

/// The process-wide workbook handle shared by every table accessor.
pub type SharedBackend = Arc<dyn SheetBackend>;
