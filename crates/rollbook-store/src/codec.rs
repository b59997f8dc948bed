//! Row ↔ record conversion.
//!
//! A row is a list of cell values aligned to a header; a record is a
//! column → value map. Both directions are total: missing cells decode as
//! `""`, absent fields encode as `""`, and fields or cells without a header
//! column are dropped.

use rollbook_types::Record;

/// Decode `row` against `header`.
///
/// Cells past the end of the header are ignored. Columns with a blank name
/// are skipped, so a header with gaps does not produce a `""` key.
pub fn to_record<H: AsRef<str>>(header: &[H], row: &[String]) -> Record {
    header
        .iter()
        .map(|column| column.as_ref())
        .zip(row.iter().map(String::as_str).chain(std::iter::repeat("")))
        .filter(|(column, _)| !column.is_empty())
        .collect()
}

/// Encode `record` as a row aligned to `header`.
///
/// Always returns exactly `header.len()` cells.
pub fn to_row<H: AsRef<str>>(header: &[H], record: &Record) -> Vec<String> {
    header
        .iter()
        .map(|column| record.get_or_empty(column.as_ref()).to_string())
        .collect()
}

/// Number of non-empty cells lying beyond the header's last column.
pub fn surplus_cells<H: AsRef<str>>(header: &[H], row: &[String]) -> usize {
    row.iter()
        .skip(header.len())
        .filter(|cell| !cell.is_empty())
        .count()
}
