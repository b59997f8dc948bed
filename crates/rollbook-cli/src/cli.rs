use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use rollbook_sdk::{EnrollmentStatus, PaymentStatus, RecordId, CONFIG_ENV, DEFAULT_CAPACITY};

#[derive(Parser)]
#[command(
    name = "rollbook",
    about = "Rollbook: school records kept in a workbook",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Use a workbook file at this path, overriding the configured backend
    #[arg(long, global = true)]
    pub workbook: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create any missing tables in the workbook
    Init,
    /// Manage students
    Student(StudentArgs),
    /// Manage classes
    Class(ClassArgs),
    /// Manage enrollments of students in classes
    Enrollment(EnrollmentArgs),
    /// Manage monthly payments
    Payment(PaymentArgs),
    /// Summaries over the stored records
    Report(ReportArgs),
}

#[derive(Args)]
pub struct StudentArgs {
    #[command(subcommand)]
    pub action: StudentAction,
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// Add a record
    Add(NewStudentArgs),
    /// List all records
    List,
    /// Show one record
    Show { id: RecordId },
    /// Change some fields of a record
    Update {
        id: RecordId,
        #[command(flatten)]
        patch: StudentPatchArgs,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[derive(Args)]
pub struct NewStudentArgs {
    pub name: String,
    #[arg(long)]
    pub document: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct StudentPatchArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub document: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct ClassArgs {
    #[command(subcommand)]
    pub action: ClassAction,
}

#[derive(Subcommand)]
pub enum ClassAction {
    /// Add a record
    Add(NewClassArgs),
    /// List all records
    List,
    /// Show one record
    Show { id: RecordId },
    /// Change some fields of a record
    Update {
        id: RecordId,
        #[command(flatten)]
        patch: ClassPatchArgs,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[derive(Args)]
pub struct NewClassArgs {
    pub name: String,
    #[arg(long)]
    pub level: Option<String>,
    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long)]
    pub instructor: Option<String>,
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: u32,
}

#[derive(Args)]
pub struct ClassPatchArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub level: Option<String>,
    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long)]
    pub instructor: Option<String>,
    #[arg(long)]
    pub capacity: Option<u32>,
}

#[derive(Args)]
pub struct EnrollmentArgs {
    #[command(subcommand)]
    pub action: EnrollmentAction,
}

#[derive(Subcommand)]
pub enum EnrollmentAction {
    /// Add a record
    Add(NewEnrollmentArgs),
    /// List all records
    List,
    /// Show one record
    Show { id: RecordId },
    /// Change some fields of a record
    Update {
        id: RecordId,
        #[command(flatten)]
        patch: EnrollmentPatchArgs,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[derive(Args)]
pub struct NewEnrollmentArgs {
    #[arg(long)]
    pub student: RecordId,
    #[arg(long)]
    pub class: RecordId,
    /// YYYY-MM-DD; defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long, default_value = "active")]
    pub status: EnrollmentStatus,
}

#[derive(Args)]
pub struct EnrollmentPatchArgs {
    #[arg(long)]
    pub student: Option<RecordId>,
    #[arg(long)]
    pub class: Option<RecordId>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub status: Option<EnrollmentStatus>,
}

#[derive(Args)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub action: PaymentAction,
}

#[derive(Subcommand)]
pub enum PaymentAction {
    /// Add a record
    Add(NewPaymentArgs),
    /// List all records
    List,
    /// Show one record
    Show { id: RecordId },
    /// Change some fields of a record
    Update {
        id: RecordId,
        #[command(flatten)]
        patch: PaymentPatchArgs,
    },
    /// Delete a record
    Delete { id: RecordId },
}

#[derive(Args)]
pub struct NewPaymentArgs {
    #[arg(long)]
    pub student: RecordId,
    /// Billing month, YYYY-MM
    #[arg(long)]
    pub period: String,
    #[arg(long)]
    pub amount: f64,
    #[arg(long, default_value = "pending")]
    pub status: PaymentStatus,
    /// YYYY-MM-DD; only kept for paid payments
    #[arg(long)]
    pub paid_on: Option<NaiveDate>,
}

#[derive(Args)]
pub struct PaymentPatchArgs {
    #[arg(long)]
    pub student: Option<RecordId>,
    #[arg(long)]
    pub period: Option<String>,
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long)]
    pub status: Option<PaymentStatus>,
    #[arg(long)]
    pub paid_on: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub kind: ReportKind,
}

#[derive(Subcommand)]
pub enum ReportKind {
    /// Amount collected per billing period (paid payments only)
    Revenue {
        /// Also write the report to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Active enrollments per class
    Enrollments {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_reads_shared_env_var() {
        let command = Cli::command();
        let config = command
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new(CONFIG_ENV)));
    }

    #[test]
    fn parses_nested_update() {
        let cli = Cli::try_parse_from([
            "rollbook", "student", "update", "abc123", "--phone", "555",
        ])
        .unwrap();
        match cli.command {
            Command::Student(StudentArgs {
                action: StudentAction::Update { id, patch },
            }) => {
                assert_eq!(id.as_str(), "abc123");
                assert_eq!(patch.phone.as_deref(), Some("555"));
                assert!(patch.name.is_none());
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Cli::try_parse_from([
            "rollbook", "payment", "add", "--student", "s1", "--period", "2025-09",
            "--amount", "10", "--status", "overdue",
        ])
        .is_err());
    }
}
