//! Typed views of the four school tables.
//!
//! Each entity converts to and from the untyped [`Record`] the store works
//! with. New-record inputs and partial-update patches live alongside.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use rollbook_report::parse_amount;
use rollbook_types::{
    EnrollmentStatus, PaymentStatus, Record, RecordId, TableKind, TypeError, ID_COLUMN,
};

use crate::error::{SdkError, SdkResult};

/// Stored layout of calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record type bound to one table.
pub trait Entity: Sized {
    const KIND: TableKind;

    /// Decode a stored record.
    fn from_record(record: &Record) -> SdkResult<Self>;

    /// Every column's value, `id` included.
    fn to_fields(&self) -> Record;

    fn id(&self) -> &RecordId;
}

fn record_id(record: &Record) -> SdkResult<RecordId> {
    Ok(RecordId::parse(record.get_or_empty(ID_COLUMN))?)
}

fn text(record: &Record, column: &str) -> String {
    record.get_or_empty(column).to_string()
}

/// Parse a status cell; a blank cell means the default status.
fn status<T>(record: &Record, column: &str) -> SdkResult<T>
where
    T: FromStr<Err = TypeError> + Default,
{
    let raw = record.get_or_empty(column).trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    Ok(raw.parse()?)
}

fn set<T: ToString>(record: &mut Record, column: &str, value: Option<T>) {
    if let Some(value) = value {
        record.insert(column, value.to_string());
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Check a `YYYY-MM` billing period.
pub fn validate_period(period: &str) -> SdkResult<()> {
    NaiveDate::parse_from_str(&format!("{}-01", period.trim()), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| SdkError::InvalidField {
            field: "period",
            reason: format!("{period:?} is not YYYY-MM"),
        })
}

fn validate_amount(amount: f64) -> SdkResult<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(SdkError::InvalidField {
            field: "amount",
            reason: format!("{amount} must be zero or more"),
        })
    }
}

fn validate_capacity(capacity: u32) -> SdkResult<()> {
    if capacity >= 1 {
        Ok(())
    } else {
        Err(SdkError::InvalidField {
            field: "capacity",
            reason: "a class needs at least one seat".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub document: String,
    pub phone: String,
    pub email: String,
    pub registration_date: String,
}

impl Entity for Student {
    const KIND: TableKind = TableKind::Students;

    fn from_record(record: &Record) -> SdkResult<Self> {
        Ok(Self {
            id: record_id(record)?,
            name: text(record, "name"),
            document: text(record, "document"),
            phone: text(record, "phone"),
            email: text(record, "email"),
            registration_date: text(record, "registration_date"),
        })
    }

    fn to_fields(&self) -> Record {
        Record::from([
            (ID_COLUMN, self.id.as_str()),
            ("name", self.name.as_str()),
            ("document", self.document.as_str()),
            ("phone", self.phone.as_str()),
            ("email", self.email.as_str()),
            ("registration_date", self.registration_date.as_str()),
        ])
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub document: String,
    pub phone: String,
    pub email: String,
}

impl NewStudent {
    pub(crate) fn into_fields(self, registration_date: String) -> Record {
        Record::from([
            ("name", self.name),
            ("document", self.document),
            ("phone", self.phone),
            ("email", self.email),
            ("registration_date", registration_date),
        ])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl StudentPatch {
    pub fn into_fields(self) -> Record {
        let mut record = Record::new();
        set(&mut record, "name", self.name);
        set(&mut record, "document", self.document);
        set(&mut record, "phone", self.phone);
        set(&mut record, "email", self.email);
        record
    }
}

// ---------------------------------------------------------------------------
// Class
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Class {
    pub id: RecordId,
    pub name: String,
    pub level: String,
    pub schedule: String,
    pub instructor: String,
    pub capacity: u32,
}

impl Entity for Class {
    const KIND: TableKind = TableKind::Classes;

    fn from_record(record: &Record) -> SdkResult<Self> {
        let raw = record.get_or_empty("capacity").trim();
        let capacity = if raw.is_empty() {
            0
        } else {
            raw.parse::<u32>().map_err(|_| SdkError::InvalidField {
                field: "capacity",
                reason: format!("{raw:?} is not a whole number"),
            })?
        };
        Ok(Self {
            id: record_id(record)?,
            name: text(record, "name"),
            level: text(record, "level"),
            schedule: text(record, "schedule"),
            instructor: text(record, "instructor"),
            capacity,
        })
    }

    fn to_fields(&self) -> Record {
        Record::from([
            (ID_COLUMN, self.id.to_string()),
            ("name", self.name.clone()),
            ("level", self.level.clone()),
            ("schedule", self.schedule.clone()),
            ("instructor", self.instructor.clone()),
            ("capacity", self.capacity.to_string()),
        ])
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Default seat count offered for new classes.
pub const DEFAULT_CAPACITY: u32 = 15;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub level: String,
    pub schedule: String,
    pub instructor: String,
    pub capacity: u32,
}

impl Default for NewClass {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: String::new(),
            schedule: String::new(),
            instructor: String::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl NewClass {
    pub(crate) fn into_fields(self) -> SdkResult<Record> {
        validate_capacity(self.capacity)?;
        Ok(Record::from([
            ("name", self.name),
            ("level", self.level),
            ("schedule", self.schedule),
            ("instructor", self.instructor),
            ("capacity", self.capacity.to_string()),
        ]))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub level: Option<String>,
    pub schedule: Option<String>,
    pub instructor: Option<String>,
    pub capacity: Option<u32>,
}

impl ClassPatch {
    pub fn into_fields(self) -> SdkResult<Record> {
        if let Some(capacity) = self.capacity {
            validate_capacity(capacity)?;
        }
        let mut record = Record::new();
        set(&mut record, "name", self.name);
        set(&mut record, "level", self.level);
        set(&mut record, "schedule", self.schedule);
        set(&mut record, "instructor", self.instructor);
        set(&mut record, "capacity", self.capacity);
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub id: RecordId,
    pub student_id: String,
    pub class_id: String,
    pub start_date: String,
    pub status: EnrollmentStatus,
}

impl Entity for Enrollment {
    const KIND: TableKind = TableKind::Enrollments;

    fn from_record(record: &Record) -> SdkResult<Self> {
        Ok(Self {
            id: record_id(record)?,
            student_id: text(record, "student_id"),
            class_id: text(record, "class_id"),
            start_date: text(record, "start_date"),
            status: status(record, "status")?,
        })
    }

    fn to_fields(&self) -> Record {
        Record::from([
            (ID_COLUMN, self.id.as_str()),
            ("student_id", self.student_id.as_str()),
            ("class_id", self.class_id.as_str()),
            ("start_date", self.start_date.as_str()),
            ("status", self.status.as_str()),
        ])
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub start_date: NaiveDate,
    pub status: EnrollmentStatus,
}

impl NewEnrollment {
    pub(crate) fn into_fields(self) -> Record {
        Record::from([
            ("student_id", self.student_id.into_string()),
            ("class_id", self.class_id.into_string()),
            ("start_date", format_date(self.start_date)),
            ("status", self.status.to_string()),
        ])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnrollmentPatch {
    pub student_id: Option<RecordId>,
    pub class_id: Option<RecordId>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<EnrollmentStatus>,
}

impl EnrollmentPatch {
    pub fn into_fields(self) -> Record {
        let mut record = Record::new();
        set(&mut record, "student_id", self.student_id);
        set(&mut record, "class_id", self.class_id);
        set(&mut record, "start_date", self.start_date.map(format_date));
        set(&mut record, "status", self.status);
        record
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Payment {
    pub id: RecordId,
    pub student_id: String,
    pub period: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_date: String,
}

impl Entity for Payment {
    const KIND: TableKind = TableKind::Payments;

    fn from_record(record: &Record) -> SdkResult<Self> {
        let raw = record.get_or_empty("amount");
        let amount = if raw.trim().is_empty() {
            0.0
        } else {
            parse_amount(raw).ok_or_else(|| SdkError::InvalidField {
                field: "amount",
                reason: format!("{raw:?} is not a number"),
            })?
        };
        Ok(Self {
            id: record_id(record)?,
            student_id: text(record, "student_id"),
            period: text(record, "period"),
            amount,
            status: status(record, "status")?,
            payment_date: text(record, "payment_date"),
        })
    }

    fn to_fields(&self) -> Record {
        Record::from([
            (ID_COLUMN, self.id.to_string()),
            ("student_id", self.student_id.clone()),
            ("period", self.period.clone()),
            ("amount", format_amount(self.amount)),
            ("status", self.status.to_string()),
            ("payment_date", self.payment_date.clone()),
        ])
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPayment {
    pub student_id: RecordId,
    pub period: String,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Only kept when `status` is paid; defaults to `today` in that case.
    pub payment_date: Option<NaiveDate>,
}

impl NewPayment {
    pub(crate) fn into_fields(self, today: NaiveDate) -> SdkResult<Record> {
        validate_period(&self.period)?;
        validate_amount(self.amount)?;
        let payment_date = if self.status.is_paid() {
            format_date(self.payment_date.unwrap_or(today))
        } else {
            String::new()
        };
        Ok(Record::from([
            ("student_id", self.student_id.into_string()),
            ("period", self.period.trim().to_string()),
            ("amount", format_amount(self.amount)),
            ("status", self.status.to_string()),
            ("payment_date", payment_date),
        ]))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentPatch {
    pub student_id: Option<RecordId>,
    pub period: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<PaymentStatus>,
    pub payment_date: Option<NaiveDate>,
}

impl PaymentPatch {
    /// Changing the status to anything but paid clears the payment date.
    /// Marking a payment paid without a date stamps `today`. A date with no
    /// status is written as given; `School::update_payment` checks it
    /// against the stored status first.
    pub fn into_fields(self, today: NaiveDate) -> SdkResult<Record> {
        if let Some(period) = &self.period {
            validate_period(period)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        let mut record = Record::new();
        set(&mut record, "student_id", self.student_id);
        set(&mut record, "period", self.period.map(|p| p.trim().to_string()));
        set(&mut record, "amount", self.amount.map(format_amount));
        set(&mut record, "status", self.status);
        match self.status {
            Some(status) if !status.is_paid() => {
                record.insert("payment_date", "");
            }
            Some(_) => {
                record.insert("payment_date", format_date(self.payment_date.unwrap_or(today)));
            }
            None => set(&mut record, "payment_date", self.payment_date.map(format_date)),
        }
        Ok(record)
    }
}
