use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("record id must not be empty")]
    EmptyId,

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("invalid {field}: {value:?} (expected one of {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: String,
    },
}
