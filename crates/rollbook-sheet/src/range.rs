//! A1-notation addressing.
//!
//! Columns are lettered `A..Z, AA..AZ, BA..` and rows numbered from 1, so
//! `(row 5, column 6)` is `F5`.

use std::fmt;

/// Letters for a 1-based column number (`1 → A`, `27 → AA`).
///
/// Column `0` has no letter and yields an empty string.
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 label for a 1-based `(row, col)` cell.
pub fn rowcol_to_a1(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}

/// A horizontal run of cells within one row, `first_col..=last_col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl RowRange {
    /// Cells `A{row}` through column `width` of the same row.
    pub fn leading(row: usize, width: usize) -> Self {
        Self {
            row,
            first_col: 1,
            last_col: width,
        }
    }

    /// Number of cells covered; zero for an inverted range.
    pub fn width(&self) -> usize {
        (self.last_col + 1).saturating_sub(self.first_col)
    }

    pub fn to_a1(&self) -> String {
        format!(
            "{}:{}",
            rowcol_to_a1(self.row, self.first_col),
            rowcol_to_a1(self.row, self.last_col)
        )
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}
