use std::collections::BTreeMap;

use tracing::info;

use rollbook_sheet::SharedBackend;
use rollbook_types::{Record, RecordId, ID_COLUMN};

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::table::{RowPosition, Table, Validation};

/// Create/read/update/delete over the tables of one workbook.
///
/// Every operation re-reads what it needs from the workbook; nothing is
/// cached between calls except the set of opened tables. Storage errors
/// surface as [`StoreError::StorageUnavailable`] and are never retried, and
/// a mutation that fails half-way is not rolled back.
///
/// # Concurrent sessions
///
/// Between locating a row and mutating it another session may delete an
/// earlier row, shifting the target. `update` and `delete` re-read the
/// target row and compare its id right before writing, failing with
/// [`StoreError::RowMoved`] on a mismatch. This narrows the window but does
/// not close it; the workbook offers no transactions.
pub struct RecordStore {
    backend: SharedBackend,
    validation: Validation,
    tables: BTreeMap<String, Table>,
}

impl RecordStore {
    pub fn new(backend: SharedBackend, validation: Validation) -> Self {
        Self {
            backend,
            validation,
            tables: BTreeMap::new(),
        }
    }

    /// Ensure `name` exists with `header` and make it available to the CRUD
    /// operations. Re-opening a table re-runs the header check.
    pub fn open_table(&mut self, name: &str, header: &[&str]) -> StoreResult<&Table> {
        let table = Table::ensure(self.backend.clone(), name, header, self.validation)?;
        self.tables.insert(name.to_string(), table);
        self.table(name)
    }

    /// An opened table.
    pub fn table(&self, name: &str) -> StoreResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Names of the opened tables, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn validation(&self) -> Validation {
        self.validation
    }

    /// Append a new record and return its freshly generated id.
    ///
    /// An `id` field in `fields` is overwritten. Fields without a column in
    /// the stored header are dropped.
    pub fn create(&self, table: &str, fields: &Record) -> StoreResult<RecordId> {
        let table = self.table(table)?;
        let header = table.headers()?;
        let id = RecordId::generate();

        let mut record = fields.clone();
        record.insert(ID_COLUMN, id.as_str());
        let row = table.append(&codec::to_row(&header, &record))?;

        info!(table = table.name(), id = %id, row, "record created");
        Ok(id)
    }

    /// Every record, in storage order.
    pub fn read_all(&self, table: &str) -> StoreResult<Vec<Record>> {
        self.table(table)?.all_rows()
    }

    /// The record carrying `id`, or `None`.
    pub fn find(&self, table: &str, id: &RecordId) -> StoreResult<Option<Record>> {
        Ok(self
            .table(table)?
            .locate(id.as_str())?
            .map(|(_, record)| record))
    }

    /// Overlay `patch` onto the record carrying `id`.
    ///
    /// Columns absent from `patch` keep their stored values; the id and the
    /// row position never change.
    pub fn update(&self, table: &str, id: &RecordId, patch: &Record) -> StoreResult<()> {
        let table = self.table(table)?;
        let position = self.resolve(table, id)?;
        let header = table.headers()?;

        let mut current = self.confirm(table, &header, &position, id)?;
        current.merge(patch);
        current.insert(ID_COLUMN, id.as_str());

        let row = position.get();
        table.replace_row(position, &codec::to_row(&header, &current))?;
        info!(table = table.name(), id = %id, row, fields = patch.len(), "record updated");
        Ok(())
    }

    /// Remove the record carrying `id`.
    pub fn delete(&self, table: &str, id: &RecordId) -> StoreResult<()> {
        let table = self.table(table)?;
        let position = self.resolve(table, id)?;
        let header = table.headers()?;
        self.confirm(table, &header, &position, id)?;

        let row = position.get();
        table.delete_row(position)?;
        info!(table = table.name(), id = %id, row, "record deleted");
        Ok(())
    }

    fn resolve(&self, table: &Table, id: &RecordId) -> StoreResult<RowPosition> {
        table
            .row_index_of(id.as_str())?
            .ok_or_else(|| StoreError::NotFound {
                table: table.name().to_string(),
                id: id.clone(),
            })
    }

    /// Re-read the row at `position` and check it still carries `id`.
    fn confirm(
        &self,
        table: &Table,
        header: &[String],
        position: &RowPosition,
        id: &RecordId,
    ) -> StoreResult<Record> {
        let current = table.read_row(header, position)?;
        if current.id() != Some(id.as_str()) {
            return Err(StoreError::RowMoved {
                table: table.name().to_string(),
                id: id.clone(),
                row: position.get(),
            });
        }
        Ok(current)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("tables", &self.table_names())
            .field("validation", &self.validation)
            .finish()
    }
}
