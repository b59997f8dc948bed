use std::path::Path;

use serde::Serialize;

use crate::error::{ReportError, ReportResult};

/// Render `rows` as CSV with a header line taken from the field names.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> ReportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `rows` as a CSV file at `path`, replacing any existing file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ReportResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ClassHeadcount, PeriodRevenue};

    #[test]
    fn revenue_csv_has_header_and_rows() {
        let rows = vec![
            PeriodRevenue { period: "2025-09".into(), total: 200.5 },
            PeriodRevenue { period: "2025-10".into(), total: 100.0 },
        ];
        let csv = to_csv_string(&rows).unwrap();
        assert_eq!(csv, "period,total\n2025-09,200.5\n2025-10,100.0\n");
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let rows = vec![ClassHeadcount {
            class_id: "c1".into(),
            class_name: "Tangos, Tientos".into(),
            active: 3,
        }];
        let csv = to_csv_string(&rows).unwrap();
        assert!(csv.contains("\"Tangos, Tientos\""));
    }

    #[test]
    fn write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revenue.csv");
        write_csv(&path, &[PeriodRevenue { period: "2025-09".into(), total: 1.0 }]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("period,total\n"));
    }

    #[test]
    fn empty_report_writes_nothing() {
        let rows: Vec<PeriodRevenue> = Vec::new();
        assert_eq!(to_csv_string(&rows).unwrap(), "");
    }
}
