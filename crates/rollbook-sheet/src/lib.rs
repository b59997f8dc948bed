//! Workbook storage medium for Rollbook.
//!
//! A workbook is a set of named worksheets, each a grid of string cells
//! addressed by 1-based row and column. Rollbook keeps one table per
//! worksheet with the header in row one; this crate knows nothing about
//! headers or records, only rows.
//!
//! # Storage Backends
//!
//! All backends implement the [`SheetBackend`] trait:
//!
//! - [`InMemoryWorkbook`] -- grid held behind a `RwLock`, for tests and embedding
//! - [`FileWorkbook`] -- JSON document on disk, rewritten atomically on every mutation
//!
//! # Design Rules
//!
//! 1. Every call is one round-trip; backends never batch or defer writes.
//! 2. A row write either lands completely or fails with an error.
//! 3. Deleting a row shifts every later row up by one.
//! 4. Backends never cache row positions on behalf of callers.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod grid;
pub mod memory;
pub mod range;
pub mod traits;

pub use error::{SheetError, SheetResult};
pub use file::FileWorkbook;
pub use grid::{Workbook, Worksheet};
pub use memory::InMemoryWorkbook;
pub use range::{column_letter, rowcol_to_a1, RowRange};
pub use traits::{SharedBackend, SheetBackend};
