//! JSON-file workbook.
//!
//! The whole workbook lives in one JSON document. Every call re-reads the
//! file, and every mutation writes a complete new document to a temporary
//! file in the same directory before renaming it over the original, so a
//! crash mid-write leaves the previous version intact and a row is never
//! half-written.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{SheetError, SheetResult};
use crate::grid::Workbook;
use crate::range::RowRange;
use crate::traits::SheetBackend;

/// Workbook persisted as a JSON document on disk.
#[derive(Debug)]
pub struct FileWorkbook {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileWorkbook {
    /// Open the workbook at `path`, creating an empty one if the file does
    /// not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> SheetResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let workbook = Self {
            path,
            write_lock: Mutex::new(()),
        };
        if !workbook.path.exists() {
            workbook.save(&Workbook::new())?;
            debug!(path = %workbook.path.display(), "created workbook file");
        }
        Ok(workbook)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document from disk.
    pub fn load(&self) -> SheetResult<Workbook> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Workbook::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SheetError::Serialization(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, book: &Workbook) -> SheetResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, book)
                .map_err(|e| SheetError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| SheetError::Io(e.error))?;
        Ok(())
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Workbook) -> SheetResult<T>) -> SheetResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| SheetError::Unavailable(format!("lock poisoned: {e}")))?;
        let mut book = self.load()?;
        let out = op(&mut book)?;
        self.save(&book)?;
        Ok(out)
    }
}

impl SheetBackend for FileWorkbook {
    fn has_worksheet(&self, title: &str) -> SheetResult<bool> {
        Ok(self.load()?.has_worksheet(title))
    }

    fn add_worksheet(&self, title: &str, rows: usize, cols: usize) -> SheetResult<()> {
        self.mutate(|book| book.add_worksheet(title, rows, cols))
    }

    fn worksheet_titles(&self) -> SheetResult<Vec<String>> {
        Ok(self.load()?.titles())
    }

    fn row_values(&self, title: &str, row: usize) -> SheetResult<Vec<String>> {
        self.load()?.sheet(title)?.row_values(row)
    }

    fn all_values(&self, title: &str) -> SheetResult<Vec<Vec<String>>> {
        Ok(self.load()?.sheet(title)?.all_values())
    }

    fn append_row(&self, title: &str, values: &[String]) -> SheetResult<usize> {
        self.mutate(|book| Ok(book.sheet_mut(title)?.append_row(values)))
    }

    fn update_range(&self, title: &str, range: &RowRange, values: &[String]) -> SheetResult<()> {
        self.mutate(|book| book.sheet_mut(title)?.update_range(range, values))
    }

    fn delete_row(&self, title: &str, row: usize) -> SheetResult<()> {
        self.mutate(|book| book.sheet_mut(title)?.delete_row(row))
    }
}
