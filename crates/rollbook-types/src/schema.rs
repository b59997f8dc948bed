//! Declared table headers.
//!
//! Each table's header is the ordered list of column names expected in row
//! one of its worksheet. This module is the single source of truth for
//! column order; the codec and the table accessor both read it from here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const STUDENTS: &[&str] = &["id", "name", "document", "phone", "email", "registration_date"];
const CLASSES: &[&str] = &["id", "name", "level", "schedule", "instructor", "capacity"];
const ENROLLMENTS: &[&str] = &["id", "student_id", "class_id", "start_date", "status"];
const PAYMENTS: &[&str] = &["id", "student_id", "period", "amount", "status", "payment_date"];

/// The tables a school workbook holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Students,
    Classes,
    Enrollments,
    Payments,
}

impl TableKind {
    /// Every table, in the order they are created on a fresh workbook.
    pub const ALL: [TableKind; 4] = [
        TableKind::Students,
        TableKind::Classes,
        TableKind::Enrollments,
        TableKind::Payments,
    ];

    /// Worksheet title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Classes => "Classes",
            Self::Enrollments => "Enrollments",
            Self::Payments => "Payments",
        }
    }

    /// Declared header, `id` first.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Students => STUDENTS,
            Self::Classes => CLASSES,
            Self::Enrollments => ENROLLMENTS,
            Self::Payments => PAYMENTS,
        }
    }

    /// Look up a table by its worksheet title (case-insensitive).
    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.title().eq_ignore_ascii_case(title.trim()))
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for TableKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_title(s).ok_or_else(|| TypeError::UnknownTable(s.to_string()))
    }
}

/// Declared header for a worksheet title, if it names a known table.
pub fn header_for(table_name: &str) -> Option<&'static [&'static str]> {
    TableKind::from_title(table_name).map(TableKind::header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ID_COLUMN;

    #[test]
    fn every_header_starts_with_id() {
        for kind in TableKind::ALL {
            assert_eq!(kind.header()[0], ID_COLUMN, "{kind}");
        }
    }

    #[test]
    fn headers_have_no_duplicate_columns() {
        for kind in TableKind::ALL {
            let header = kind.header();
            for (i, col) in header.iter().enumerate() {
                assert!(!header[i + 1..].contains(col), "{kind}: duplicate {col}");
            }
        }
    }

    #[test]
    fn header_for_known_and_unknown_titles() {
        assert_eq!(header_for("Payments"), Some(PAYMENTS));
        assert_eq!(header_for("students"), Some(STUDENTS));
        assert_eq!(header_for("Teachers"), None);
    }

    #[test]
    fn parse_table_kind() {
        assert_eq!("enrollments".parse::<TableKind>(), Ok(TableKind::Enrollments));
        assert_eq!(
            "nope".parse::<TableKind>(),
            Err(TypeError::UnknownTable("nope".into()))
        );
    }

    #[test]
    fn title_round_trips_through_from_title() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::from_title(kind.title()), Some(kind));
        }
    }
}
