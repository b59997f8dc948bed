//! Tabular record store for Rollbook.
//!
//! Treats each worksheet of a workbook as a table: row one is the header,
//! every later row is one record, and the `id` column is the primary key.
//! The store layers create/read/update/delete on top of the row-level
//! [`SheetBackend`](rollbook_sheet::SheetBackend) contract, which has no
//! transactions and no index.
//!
//! # Layers
//!
//! - [`codec`] -- row ↔ [`Record`](rollbook_types::Record) conversion
//! - [`Table`] -- one worksheet bound to its declared header
//! - [`RecordStore`] -- CRUD by id across opened tables
//!
//! # Design Rules
//!
//! 1. Row positions are resolved immediately before each mutation and never
//!    kept; [`RowPosition`] is consumed by the mutation it was resolved for.
//! 2. Updates read the current row first, so fields missing from a patch
//!    keep their stored value.
//! 3. An existing header is never rewritten or reordered.
//! 4. Storage errors propagate unmodified; nothing is retried or rolled back.

pub mod codec;
pub mod error;
pub mod store;
pub mod table;

pub use error::{StoreError, StoreResult};
pub use store::RecordStore;
pub use table::{RowPosition, Table, Validation, NEW_SHEET_MIN_COLS, NEW_SHEET_ROWS};
