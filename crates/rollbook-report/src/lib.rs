//! Reports over Rollbook tables.
//!
//! Everything here works on records already read with `read_all`; nothing
//! touches the workbook. Two reports are provided, each exportable as CSV:
//!
//! - [`revenue_by_period`] -- amount collected per billing period
//! - [`active_enrollments_by_class`] -- head count of active enrollments

pub mod aggregate;
pub mod error;
pub mod export;

pub use aggregate::{
    active_enrollments_by_class, parse_amount, revenue_by_period, ClassHeadcount, PeriodRevenue,
};
pub use error::{ReportError, ReportResult};
pub use export::{to_csv_string, write_csv};
