use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("{table} has no record {id}; create it first")]
    UnknownReference { table: String, id: String },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] rollbook_store::StoreError),

    #[error("workbook error: {0}")]
    Sheet(#[from] rollbook_sheet::SheetError),

    #[error(transparent)]
    Type(#[from] rollbook_types::TypeError),

    #[error("report error: {0}")]
    Report(#[from] rollbook_report::ReportError),
}

impl SdkError {
    /// Whether the error is an update/delete against an id that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
