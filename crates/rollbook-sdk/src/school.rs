//! The `School` facade: typed operations over the four school tables.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use rollbook_report::{active_enrollments_by_class, revenue_by_period, ClassHeadcount, PeriodRevenue};
use rollbook_sheet::SharedBackend;
use rollbook_store::{RecordStore, Validation};
use rollbook_types::{local_timestamp, school_offset, Record, RecordId, TableKind, ID_COLUMN};

use crate::connection::LazyWorkbook;
use crate::entity::{
    Class, ClassPatch, Enrollment, EnrollmentPatch, Entity, NewClass, NewEnrollment, NewPayment,
    NewStudent, Payment, PaymentPatch, Student, StudentPatch,
};
use crate::error::{SdkError, SdkResult};

/// A school's records, stored one table per worksheet.
///
/// Opening a `School` makes sure all four tables exist with their headers.
/// Every read goes back to the workbook.
pub struct School {
    store: RecordStore,
}

impl School {
    /// Connect (if not yet connected) and open the default tables.
    pub fn open(workbook: &LazyWorkbook) -> SdkResult<Self> {
        Self::with_backend(workbook.handle()?, workbook.config().validation)
    }

    pub fn with_backend(backend: SharedBackend, validation: Validation) -> SdkResult<Self> {
        let mut store = RecordStore::new(backend, validation);
        for kind in TableKind::ALL {
            store.open_table(kind.title(), kind.header())?;
        }
        info!(tables = TableKind::ALL.len(), ?validation, "school opened");
        Ok(Self { store })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Raw records of one table, in storage order.
    pub fn records(&self, kind: TableKind) -> SdkResult<Vec<Record>> {
        Ok(self.store.read_all(kind.title())?)
    }

    /// Every decodable record of `E`'s table. Rows that fail to decode
    /// (blank id, unknown status, malformed number) are skipped and logged.
    pub fn list<E: Entity>(&self) -> SdkResult<Vec<E>> {
        let records = self.records(E::KIND)?;
        let mut entities = Vec::with_capacity(records.len());
        for record in &records {
            match E::from_record(record) {
                Ok(entity) => entities.push(entity),
                Err(e) => warn!(
                    table = E::KIND.title(),
                    id = record.id().unwrap_or_default(),
                    error = %e,
                    "skipping undecodable row"
                ),
            }
        }
        Ok(entities)
    }

    pub fn get<E: Entity>(&self, id: &RecordId) -> SdkResult<Option<E>> {
        self.store
            .find(E::KIND.title(), id)?
            .map(|record| E::from_record(&record))
            .transpose()
    }

    /// Delete one record. Nothing that references it is touched.
    pub fn delete<E: Entity>(&self, id: &RecordId) -> SdkResult<()> {
        Ok(self.store.delete(E::KIND.title(), id)?)
    }

    // -----------------------------------------------------------------------
    // Students and classes
    // -----------------------------------------------------------------------

    pub fn add_student(&self, student: NewStudent) -> SdkResult<Student> {
        self.insert(student.into_fields(local_timestamp()))
    }

    pub fn update_student(&self, id: &RecordId, patch: StudentPatch) -> SdkResult<()> {
        self.patch::<Student>(id, &patch.into_fields())
    }

    pub fn add_class(&self, class: NewClass) -> SdkResult<Class> {
        self.insert(class.into_fields()?)
    }

    pub fn update_class(&self, id: &RecordId, patch: ClassPatch) -> SdkResult<()> {
        self.patch::<Class>(id, &patch.into_fields()?)
    }

    // -----------------------------------------------------------------------
    // Enrollments and payments
    // -----------------------------------------------------------------------

    /// Enroll a student in a class. Both must exist.
    pub fn enroll(&self, enrollment: NewEnrollment) -> SdkResult<Enrollment> {
        self.require(TableKind::Students, &enrollment.student_id)?;
        self.require(TableKind::Classes, &enrollment.class_id)?;
        self.insert(enrollment.into_fields())
    }

    pub fn update_enrollment(&self, id: &RecordId, patch: EnrollmentPatch) -> SdkResult<()> {
        if let Some(student_id) = &patch.student_id {
            self.require(TableKind::Students, student_id)?;
        }
        if let Some(class_id) = &patch.class_id {
            self.require(TableKind::Classes, class_id)?;
        }
        self.patch::<Enrollment>(id, &patch.into_fields())
    }

    /// Record a payment for an existing student.
    pub fn record_payment(&self, payment: NewPayment) -> SdkResult<Payment> {
        self.require(TableKind::Students, &payment.student_id)?;
        self.insert(payment.into_fields(today())?)
    }

    /// A patch that sets only `payment_date` is refused unless the stored
    /// payment is already paid.
    pub fn update_payment(&self, id: &RecordId, patch: PaymentPatch) -> SdkResult<()> {
        if let Some(student_id) = &patch.student_id {
            self.require(TableKind::Students, student_id)?;
        }
        if patch.status.is_none() && patch.payment_date.is_some() {
            if let Some(stored) = self.get::<Payment>(id)? {
                if !stored.status.is_paid() {
                    return Err(SdkError::InvalidField {
                        field: "payment_date",
                        reason: format!(
                            "payment {id} is {}; only paid payments carry a date",
                            stored.status
                        ),
                    });
                }
            }
        }
        self.patch::<Payment>(id, &patch.into_fields(today())?)
    }

    // -----------------------------------------------------------------------
    // Reports
    // -----------------------------------------------------------------------

    pub fn revenue_report(&self) -> SdkResult<Vec<PeriodRevenue>> {
        Ok(revenue_by_period(&self.records(TableKind::Payments)?))
    }

    pub fn enrollment_report(&self) -> SdkResult<Vec<ClassHeadcount>> {
        let enrollments = self.records(TableKind::Enrollments)?;
        let classes = self.records(TableKind::Classes)?;
        Ok(active_enrollments_by_class(&enrollments, &classes))
    }

    fn insert<E: Entity>(&self, mut fields: Record) -> SdkResult<E> {
        let id = self.store.create(E::KIND.title(), &fields)?;
        fields.insert(ID_COLUMN, id.into_string());
        E::from_record(&fields)
    }

    fn patch<E: Entity>(&self, id: &RecordId, fields: &Record) -> SdkResult<()> {
        if fields.is_empty() {
            debug!(table = E::KIND.title(), %id, "empty patch, nothing to write");
        }
        Ok(self.store.update(E::KIND.title(), id, fields)?)
    }

    fn require(&self, kind: TableKind, id: &RecordId) -> SdkResult<()> {
        match self.store.find(kind.title(), id)? {
            Some(_) => Ok(()),
            None => Err(SdkError::UnknownReference {
                table: kind.title().to_string(),
                id: id.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for School {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("School")
            .field("tables", &self.store.table_names())
            .field("validation", &self.store.validation())
            .finish()
    }
}

/// Today's date in the school's time zone.
fn today() -> NaiveDate {
    Utc::now().with_timezone(&school_offset()).date_naive()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rollbook_sheet::{InMemoryWorkbook, SheetBackend};
    use rollbook_types::{EnrollmentStatus, PaymentStatus};

    use super::*;
    use crate::config::{BackendConfig, SchoolConfig};

    fn school() -> (School, Arc<InMemoryWorkbook>) {
        let book = Arc::new(InMemoryWorkbook::new());
        let school = School::with_backend(book.clone(), Validation::Lenient).unwrap();
        (school, book)
    }

    fn ana() -> NewStudent {
        NewStudent {
            name: "Ana".into(),
            document: "123".into(),
            ..NewStudent::default()
        }
    }

    fn sevillanas() -> NewClass {
        NewClass {
            name: "Sevillanas".into(),
            level: "beginner".into(),
            ..NewClass::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_creates_all_tables_with_headers() {
        let (_, book) = school();
        for kind in TableKind::ALL {
            assert!(book.has_worksheet(kind.title()).unwrap());
            let header = book.row_values(kind.title(), 1).unwrap();
            assert_eq!(header, kind.header());
        }
    }

    #[test]
    fn reopening_does_not_duplicate_headers() {
        let (first, book) = school();
        first.add_student(ana()).unwrap();
        let again = School::with_backend(book.clone(), Validation::Lenient).unwrap();
        assert_eq!(again.list::<Student>().unwrap().len(), 1);
        assert_eq!(book.all_values("Students").unwrap().len(), 2);
    }

    #[test]
    fn open_through_lazy_workbook() {
        let lazy = LazyWorkbook::new(SchoolConfig {
            backend: BackendConfig::Memory,
            ..SchoolConfig::default()
        });
        let school = School::open(&lazy).unwrap();
        assert!(lazy.is_connected());
        assert!(school.list::<Class>().unwrap().is_empty());
    }

    #[test]
    fn ana_scenario() {
        let (school, _) = school();
        let student = school.add_student(ana()).unwrap();
        assert_eq!(student.id.as_str().len(), 12);
        assert_eq!(student.registration_date.len(), "2025-09-01 10:00:00".len());

        school
            .update_student(
                &student.id,
                StudentPatch {
                    phone: Some("555".into()),
                    ..StudentPatch::default()
                },
            )
            .unwrap();
        let stored: Student = school.get(&student.id).unwrap().unwrap();
        assert_eq!(stored.name, "Ana");
        assert_eq!(stored.document, "123");
        assert_eq!(stored.phone, "555");
        assert_eq!(stored.registration_date, student.registration_date);

        school.delete::<Student>(&student.id).unwrap();
        assert!(school.get::<Student>(&student.id).unwrap().is_none());
        let err = school
            .update_student(&student.id, StudentPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn enroll_checks_references() {
        let (school, _) = school();
        let student = school.add_student(ana()).unwrap();
        let class = school.add_class(sevillanas()).unwrap();
        assert_eq!(class.capacity, 15);

        let enrollment = school
            .enroll(NewEnrollment {
                student_id: student.id.clone(),
                class_id: class.id.clone(),
                start_date: date(2025, 3, 4),
                status: EnrollmentStatus::Active,
            })
            .unwrap();
        assert_eq!(enrollment.start_date, "2025-03-04");

        let err = school
            .enroll(NewEnrollment {
                student_id: student.id.clone(),
                class_id: RecordId::parse("nope").unwrap(),
                start_date: date(2025, 3, 4),
                status: EnrollmentStatus::Active,
            })
            .unwrap_err();
        assert!(matches!(err, SdkError::UnknownReference { ref table, .. } if table == "Classes"));
        assert_eq!(school.list::<Enrollment>().unwrap().len(), 1);
    }

    #[test]
    fn update_enrollment_status() {
        let (school, _) = school();
        let student = school.add_student(ana()).unwrap();
        let class = school.add_class(sevillanas()).unwrap();
        let enrollment = school
            .enroll(NewEnrollment {
                student_id: student.id,
                class_id: class.id,
                start_date: date(2025, 3, 4),
                status: EnrollmentStatus::Active,
            })
            .unwrap();
        school
            .update_enrollment(
                &enrollment.id,
                EnrollmentPatch {
                    status: Some(EnrollmentStatus::Completed),
                    ..EnrollmentPatch::default()
                },
            )
            .unwrap();
        let stored: Enrollment = school.get(&enrollment.id).unwrap().unwrap();
        assert_eq!(stored.status, EnrollmentStatus::Completed);
        assert_eq!(stored.start_date, "2025-03-04");
    }

    #[test]
    fn payment_for_unknown_student_is_refused() {
        let (school, _) = school();
        let err = school
            .record_payment(NewPayment {
                student_id: RecordId::parse("ghost").unwrap(),
                period: "2025-09".into(),
                amount: 150.0,
                status: PaymentStatus::Paid,
                payment_date: None,
            })
            .unwrap_err();
        assert!(matches!(err, SdkError::UnknownReference { .. }));
        assert!(school.list::<Payment>().unwrap().is_empty());
    }

    #[test]
    fn payments_feed_revenue_report() {
        let (school, _) = school();
        let student = school.add_student(ana()).unwrap();
        for (period, amount, status) in [
            ("2025-09", 150.0, PaymentStatus::Paid),
            ("2025-09", 150.0, PaymentStatus::Pending),
            ("2025-10", 120.5, PaymentStatus::Paid),
        ] {
            school
                .record_payment(NewPayment {
                    student_id: student.id.clone(),
                    period: period.into(),
                    amount,
                    status,
                    payment_date: None,
                })
                .unwrap();
        }
        let pending = school
            .list::<Payment>()
            .unwrap()
            .into_iter()
            .find(|p| p.status == PaymentStatus::Pending)
            .unwrap();
        assert_eq!(pending.payment_date, "");

        school
            .update_payment(
                &pending.id,
                PaymentPatch {
                    status: Some(PaymentStatus::Paid),
                    payment_date: Some(date(2025, 9, 20)),
                    ..PaymentPatch::default()
                },
            )
            .unwrap();

        let report = school.revenue_report().unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0], PeriodRevenue { period: "2025-09".into(), total: 300.0 });
        assert_eq!(report[1], PeriodRevenue { period: "2025-10".into(), total: 120.5 });
    }

    fn pending_payment(school: &School) -> Payment {
        let student = school.add_student(ana()).unwrap();
        school
            .record_payment(NewPayment {
                student_id: student.id,
                period: "2025-09".into(),
                amount: 150.0,
                status: PaymentStatus::Pending,
                payment_date: None,
            })
            .unwrap()
    }

    #[test]
    fn date_alone_cannot_be_set_on_unpaid_payment() {
        let (school, _) = school();
        let payment = pending_payment(&school);

        let err = school
            .update_payment(
                &payment.id,
                PaymentPatch {
                    payment_date: Some(date(2025, 9, 1)),
                    ..PaymentPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidField { field: "payment_date", .. }));

        let stored: Payment = school.get(&payment.id).unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.payment_date, "");
    }

    #[test]
    fn date_alone_can_be_corrected_on_paid_payment() {
        let (school, _) = school();
        let payment = pending_payment(&school);
        school
            .update_payment(
                &payment.id,
                PaymentPatch {
                    status: Some(PaymentStatus::Paid),
                    payment_date: Some(date(2025, 9, 10)),
                    ..PaymentPatch::default()
                },
            )
            .unwrap();
        school
            .update_payment(
                &payment.id,
                PaymentPatch {
                    payment_date: Some(date(2025, 9, 12)),
                    ..PaymentPatch::default()
                },
            )
            .unwrap();
        let stored: Payment = school.get(&payment.id).unwrap().unwrap();
        assert_eq!(stored.payment_date, "2025-09-12");
    }

    #[test]
    fn list_skips_rows_that_do_not_decode() {
        let (school, book) = school();
        school.add_student(ana()).unwrap();
        let student = school.list::<Student>().unwrap().remove(0);
        let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        book.append_row(
            "Enrollments",
            &row(&["e-legacy", student.id.as_str(), "c1", "2024-01-01", "ativa"]),
        )
        .unwrap();
        book.append_row("Enrollments", &row(&["", student.id.as_str(), "c1", "2024-01-01", "active"]))
            .unwrap();
        book.append_row(
            "Enrollments",
            &row(&["e-good", student.id.as_str(), "c1", "2024-01-01", "active"]),
        )
        .unwrap();

        let enrollments = school.list::<Enrollment>().unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].id.as_str(), "e-good");
    }

    #[test]
    fn enrollment_report_counts_active() {
        let (school, _) = school();
        let student = school.add_student(ana()).unwrap();
        let class = school.add_class(sevillanas()).unwrap();
        for status in [EnrollmentStatus::Active, EnrollmentStatus::Cancelled] {
            school
                .enroll(NewEnrollment {
                    student_id: student.id.clone(),
                    class_id: class.id.clone(),
                    start_date: date(2025, 1, 1),
                    status,
                })
                .unwrap();
        }
        let report = school.enrollment_report().unwrap();
        assert_eq!(
            report,
            vec![ClassHeadcount {
                class_id: class.id.to_string(),
                class_name: "Sevillanas".into(),
                active: 1,
            }]
        );
    }
}
