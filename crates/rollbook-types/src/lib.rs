//! Foundation types for Rollbook.
//!
//! Every other Rollbook crate depends on `rollbook-types`. Nothing in here
//! performs I/O.
//!
//! # Key Types
//!
//! - [`RecordId`] -- Short random identifier assigned to every record
//! - [`TableKind`] -- The four school tables and their declared headers
//! - [`Record`] -- Column → value mapping for one row
//! - [`EnrollmentStatus`], [`PaymentStatus`] -- Closed status vocabularies
//! - [`local_timestamp`] -- Wall-clock stamp used for registration dates

pub mod error;
pub mod id;
pub mod record;
pub mod schema;
pub mod status;
pub mod temporal;

pub use error::TypeError;
pub use id::{new_id, RecordId, ID_COLUMN, ID_LEN};
pub use record::Record;
pub use schema::{header_for, TableKind};
pub use status::{EnrollmentStatus, PaymentStatus};
pub use temporal::{format_timestamp, local_timestamp, school_offset, TIMESTAMP_FORMAT};
