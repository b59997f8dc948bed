//! High-level SDK for Rollbook.
//!
//! Wraps the record store in a [`School`] with typed students, classes,
//! enrollments and payments.
//!
//! # Quick Start
//!
//! ```no_run
//! use rollbook_sdk::{LazyWorkbook, NewStudent, School, SchoolConfig};
//!
//! let workbook = LazyWorkbook::new(SchoolConfig::default());
//! let school = School::open(&workbook)?;
//! let ana = school.add_student(NewStudent {
//!     name: "Ana".into(),
//!     ..NewStudent::default()
//! })?;
//! println!("registered {} as {}", ana.name, ana.id);
//! # Ok::<(), rollbook_sdk::SdkError>(())
//! ```

pub mod config;
pub mod connection;
pub mod entity;
pub mod error;
pub mod school;

pub use config::{BackendConfig, SchoolConfig, CONFIG_ENV, DEFAULT_WORKBOOK_PATH};
pub use connection::LazyWorkbook;
pub use entity::{
    Class, ClassPatch, Enrollment, EnrollmentPatch, Entity, NewClass, NewEnrollment, NewPayment,
    NewStudent, Payment, PaymentPatch, Student, StudentPatch, DATE_FORMAT, DEFAULT_CAPACITY,
};
pub use error::{SdkError, SdkResult};
pub use school::School;

pub use rollbook_report::{ClassHeadcount, PeriodRevenue};
pub use rollbook_store::Validation;
pub use rollbook_types::{EnrollmentStatus, PaymentStatus, RecordId, TableKind};
