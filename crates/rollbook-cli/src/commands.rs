use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use rollbook_report::write_csv;
use rollbook_sdk::{
    BackendConfig, Class, ClassPatch, Enrollment, EnrollmentPatch, Entity, LazyWorkbook, NewClass,
    NewEnrollment, NewPayment, NewStudent, Payment, PaymentPatch, RecordId, School, SchoolConfig,
    SdkError, Student, StudentPatch, TableKind,
};
use rollbook_types::school_offset;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let workbook = LazyWorkbook::new(config);
    let out = Output { format: cli.format };

    match cli.command {
        Command::Init => cmd_init(&workbook, &out),
        Command::Student(args) => cmd_student(&open(&workbook)?, args.action, &out),
        Command::Class(args) => cmd_class(&open(&workbook)?, args.action, &out),
        Command::Enrollment(args) => cmd_enrollment(&open(&workbook)?, args.action, &out),
        Command::Payment(args) => cmd_payment(&open(&workbook)?, args.action, &out),
        Command::Report(args) => cmd_report(&open(&workbook)?, args.kind, &out),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<SchoolConfig> {
    let mut config = match &cli.config {
        Some(path) => SchoolConfig::load(path)?,
        None => SchoolConfig::default(),
    };
    if let Some(path) = &cli.workbook {
        config.backend = BackendConfig::File { path: path.clone() };
    }
    Ok(config)
}

fn open(workbook: &LazyWorkbook) -> anyhow::Result<School> {
    School::open(workbook).context("could not open the school workbook")
}

fn cmd_init(workbook: &LazyWorkbook, out: &Output) -> anyhow::Result<()> {
    let school = open(workbook)?;
    let tables = school.store().table_names();
    match out.format {
        OutputFormat::Json => out.json(&tables),
        OutputFormat::Text => {
            let location = match &workbook.config().backend {
                BackendConfig::File { path } => path.display().to_string(),
                BackendConfig::Memory => "memory".into(),
            };
            println!("{} Workbook ready at {}", "✓".green().bold(), location.bold());
            for table in tables {
                println!("  {}", table.cyan());
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Record commands
// ---------------------------------------------------------------------------

fn cmd_student(school: &School, action: StudentAction, out: &Output) -> anyhow::Result<()> {
    match action {
        StudentAction::Add(args) => {
            let student = school.add_student(NewStudent {
                name: args.name,
                document: args.document.unwrap_or_default(),
                phone: args.phone.unwrap_or_default(),
                email: args.email.unwrap_or_default(),
            })?;
            out.created(&student, &student.name)
        }
        StudentAction::List => out.records(&school.list::<Student>()?),
        StudentAction::Show { id } => show::<Student>(school, &id, out),
        StudentAction::Update { id, patch } => {
            let patch = StudentPatch {
                name: patch.name,
                document: patch.document,
                phone: patch.phone,
                email: patch.email,
            };
            school.update_student(&id, patch).map_err(|e| explain(e, &id))?;
            out.done("Updated", Student::KIND, &id)
        }
        StudentAction::Delete { id } => delete::<Student>(school, &id, out),
    }
}

fn cmd_class(school: &School, action: ClassAction, out: &Output) -> anyhow::Result<()> {
    match action {
        ClassAction::Add(args) => {
            let class = school.add_class(NewClass {
                name: args.name,
                level: args.level.unwrap_or_default(),
                schedule: args.schedule.unwrap_or_default(),
                instructor: args.instructor.unwrap_or_default(),
                capacity: args.capacity,
            })?;
            out.created(&class, &class.name)
        }
        ClassAction::List => out.records(&school.list::<Class>()?),
        ClassAction::Show { id } => show::<Class>(school, &id, out),
        ClassAction::Update { id, patch } => {
            let patch = ClassPatch {
                name: patch.name,
                level: patch.level,
                schedule: patch.schedule,
                instructor: patch.instructor,
                capacity: patch.capacity,
            };
            school.update_class(&id, patch).map_err(|e| explain(e, &id))?;
            out.done("Updated", Class::KIND, &id)
        }
        ClassAction::Delete { id } => delete::<Class>(school, &id, out),
    }
}

fn cmd_enrollment(school: &School, action: EnrollmentAction, out: &Output) -> anyhow::Result<()> {
    match action {
        EnrollmentAction::Add(args) => {
            let enrollment = school.enroll(NewEnrollment {
                student_id: args.student,
                class_id: args.class,
                start_date: args
                    .start_date
                    .unwrap_or_else(|| Utc::now().with_timezone(&school_offset()).date_naive()),
                status: args.status,
            })?;
            let label = format!("{} → {}", enrollment.student_id, enrollment.class_id);
            out.created(&enrollment, &label)
        }
        EnrollmentAction::List => out.records(&school.list::<Enrollment>()?),
        EnrollmentAction::Show { id } => show::<Enrollment>(school, &id, out),
        EnrollmentAction::Update { id, patch } => {
            let patch = EnrollmentPatch {
                student_id: patch.student,
                class_id: patch.class,
                start_date: patch.start_date,
                status: patch.status,
            };
            school.update_enrollment(&id, patch).map_err(|e| explain(e, &id))?;
            out.done("Updated", Enrollment::KIND, &id)
        }
        EnrollmentAction::Delete { id } => delete::<Enrollment>(school, &id, out),
    }
}

fn cmd_payment(school: &School, action: PaymentAction, out: &Output) -> anyhow::Result<()> {
    match action {
        PaymentAction::Add(args) => {
            let payment = school.record_payment(NewPayment {
                student_id: args.student,
                period: args.period,
                amount: args.amount,
                status: args.status,
                payment_date: args.paid_on,
            })?;
            let label = format!("{} {}", payment.period, payment.status);
            out.created(&payment, &label)
        }
        PaymentAction::List => out.records(&school.list::<Payment>()?),
        PaymentAction::Show { id } => show::<Payment>(school, &id, out),
        PaymentAction::Update { id, patch } => {
            let patch = PaymentPatch {
                student_id: patch.student,
                period: patch.period,
                amount: patch.amount,
                status: patch.status,
                payment_date: patch.paid_on,
            };
            school.update_payment(&id, patch).map_err(|e| explain(e, &id))?;
            out.done("Updated", Payment::KIND, &id)
        }
        PaymentAction::Delete { id } => delete::<Payment>(school, &id, out),
    }
}

fn show<E: Entity + Serialize>(school: &School, id: &RecordId, out: &Output) -> anyhow::Result<()> {
    match school.get::<E>(id)? {
        Some(entity) => out.record(&entity),
        None => bail!("no {} with id {id}", singular(E::KIND)),
    }
}

fn delete<E: Entity>(school: &School, id: &RecordId, out: &Output) -> anyhow::Result<()> {
    school.delete::<E>(id).map_err(|e| explain(e, id))?;
    out.done("Deleted", E::KIND, id)
}

/// Turn a missing-record error into a message naming the id.
fn explain(err: SdkError, id: &RecordId) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!("no record with id {id}; use `list` to see the stored ids")
    } else {
        err.into()
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn cmd_report(school: &School, kind: ReportKind, out: &Output) -> anyhow::Result<()> {
    match kind {
        ReportKind::Revenue { csv } => {
            let rows = school.revenue_report()?;
            if let Some(path) = &csv {
                write_csv(path, &rows).with_context(|| format!("writing {}", path.display()))?;
            }
            match out.format {
                OutputFormat::Json => out.json(&rows),
                OutputFormat::Text => {
                    let mut table = new_table(&["period", "total"]);
                    for row in &rows {
                        table.add_row(vec![row.period.clone(), format!("{:.2}", row.total)]);
                    }
                    let total: f64 = rows.iter().map(|r| r.total).sum();
                    println!("{table}");
                    println!("Total collected: {}", format!("{total:.2}").green().bold());
                    Ok(())
                }
            }
        }
        ReportKind::Enrollments { csv } => {
            let rows = school.enrollment_report()?;
            if let Some(path) = &csv {
                write_csv(path, &rows).with_context(|| format!("writing {}", path.display()))?;
            }
            match out.format {
                OutputFormat::Json => out.json(&rows),
                OutputFormat::Text => {
                    let mut table = new_table(&["class", "class_id", "active"]);
                    for row in &rows {
                        table.add_row(vec![
                            row.class_name.clone(),
                            row.class_id.clone(),
                            row.active.to_string(),
                        ]);
                    }
                    println!("{table}");
                    Ok(())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

struct Output {
    format: OutputFormat,
}

impl Output {
    fn json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn created<E: Entity + Serialize>(&self, entity: &E, label: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(entity),
            OutputFormat::Text => {
                println!(
                    "{} Added {} {} ({})",
                    "✓".green().bold(),
                    singular(E::KIND),
                    label.bold(),
                    entity.id().as_str().yellow()
                );
                Ok(())
            }
        }
    }

    fn done(&self, verb: &str, kind: TableKind, id: &RecordId) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "id": id, "status": verb.to_lowercase() })),
            OutputFormat::Text => {
                println!("{} {verb} {} {}", "✓".green().bold(), singular(kind), id.as_str().yellow());
                Ok(())
            }
        }
    }

    fn records<E: Entity + Serialize>(&self, entities: &[E]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(entities),
            OutputFormat::Text => {
                if entities.is_empty() {
                    println!("No {} yet.", E::KIND.title().to_lowercase());
                    return Ok(());
                }
                let header = E::KIND.header();
                let mut table = new_table(header);
                for entity in entities {
                    let fields = entity.to_fields();
                    table.add_row(header.iter().map(|column| fields.get_or_empty(column).to_string()));
                }
                println!("{table}");
                Ok(())
            }
        }
    }

    fn record<E: Entity + Serialize>(&self, entity: &E) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.json(entity),
            OutputFormat::Text => {
                let fields = entity.to_fields();
                for column in E::KIND.header() {
                    println!("{}: {}", format!("{column:>18}").bold(), fields.get_or_empty(column));
                }
                Ok(())
            }
        }
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn singular(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Students => "student",
        TableKind::Classes => "class",
        TableKind::Enrollments => "enrollment",
        TableKind::Payments => "payment",
    }
}
