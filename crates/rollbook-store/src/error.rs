use rollbook_sheet::SheetError;
use rollbook_types::RecordId;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row in the table carries this id.
    #[error("record {id} not found in {table}")]
    NotFound { table: String, id: RecordId },

    /// The workbook failed the request (network, permission, quota, disk).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] SheetError),

    /// The stored header diverges from the declared one.
    #[error("schema mismatch in {table}: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A stored row has non-empty cells beyond the header.
    #[error("row {row} of {table} has {actual} cells, header has {expected}")]
    RowShape {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The row resolved for `id` no longer carries it by the time it was
    /// re-read, usually because another session deleted an earlier row.
    #[error("record {id} moved away from row {row} of {table}; retry the operation")]
    RowMoved {
        table: String,
        id: RecordId,
        row: usize,
    },

    /// The table was never opened on this store.
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

impl StoreError {
    /// Whether this is the caller-recoverable "no such record" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
