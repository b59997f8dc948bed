use thiserror::Error;

/// Errors from workbook operations.
#[derive(Debug, Error)]
pub enum SheetError {
    /// No worksheet carries this title.
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// A worksheet with this title already exists.
    #[error("worksheet already exists: {0}")]
    WorksheetExists(String),

    /// The addressed row lies outside the worksheet grid.
    #[error("row {row} out of range for worksheet {title} ({rows} rows)")]
    RowOutOfRange {
        title: String,
        row: usize,
        rows: usize,
    },

    /// The addressed range does not fit the worksheet grid.
    #[error("range {range} exceeds grid of worksheet {title} ({rows}x{cols})")]
    RangeOutOfBounds {
        title: String,
        range: String,
        rows: usize,
        cols: usize,
    },

    /// The number of values written does not match the range width.
    #[error("range {range} spans {expected} cells but {actual} values were supplied")]
    WidthMismatch {
        range: String,
        expected: usize,
        actual: usize,
    },

    /// Worksheet dimensions must be at least 1x1.
    #[error("invalid grid size {rows}x{cols}")]
    InvalidGridSize { rows: usize, cols: usize },

    /// The backing service is unreachable or refused the request.
    #[error("workbook unavailable: {0}")]
    Unavailable(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for workbook operations.
pub type SheetResult<T> = Result<T, SheetError>;
