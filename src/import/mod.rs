//! Bulk employee import from an uploaded workbook.
//!
//! Rows are reconciled one at a time against the employee store by `stt`:
//! unknown numbers are created, known ones are overwritten in place. A bad
//! row is written into the report and the next row is attempted; only an
//! unreachable store stops the run.

pub mod dates;
pub mod mapper;
pub mod reader;
pub mod template;

use std::fmt;

use log::{error, info, warn};
use uuid::Uuid;

use crate::db::{EmployeeStore, UpsertOutcome};
use crate::errors::StoreError;
use crate::models::import::{ImportResult, ImportRow};

pub use dates::DateParser;
pub use mapper::InvalidStt;
pub use reader::{CalamineReader, ReadError, SheetReader};

/// Sheet row number of the first data row (row 1 holds the headers).
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug)]
enum RowError {
    MissingName,
    InvalidStt(InvalidStt),
    Store(StoreError),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingName => write!(f, "Thiếu họ tên"),
            RowError::InvalidStt(err) => write!(f, "{}", err),
            RowError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl From<StoreError> for RowError {
    fn from(err: StoreError) -> Self {
        RowError::Store(err)
    }
}

/// An import stopped because the store could not be reached. `partial`
/// reports every row handled up to and including the one that hit the
/// outage; those rows stay written.
#[derive(Debug)]
pub struct ImportAborted {
    pub partial: ImportResult,
    pub cause: StoreError,
}

impl fmt::Display for ImportAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import aborted after {} saved rows: {}",
            self.partial.success, self.cause
        )
    }
}

pub struct Importer<'a> {
    store: &'a dyn EmployeeStore,
    reader: &'a dyn SheetReader,
    dates: DateParser,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn EmployeeStore, reader: &'a dyn SheetReader, dates: DateParser) -> Self {
        Importer { store, reader, dates }
    }

    /// Imports every data row of `workbook` into `department_id`.
    ///
    /// Unreadable workbooks and bad rows end up in the returned report.
    /// `Err` is reserved for a store that cannot be reached and carries the
    /// report so far.
    pub async fn import_employees(&self, workbook: &[u8], department_id: Uuid) -> Result<ImportResult, ImportAborted> {
        let mut result = ImportResult::default();

        let rows = match self.reader.read_rows(workbook) {
            Ok(rows) => rows,
            Err(err) => {
                let message = format!("Lỗi đọc file: {}", err);
                warn!("{}", message);
                result.errors.push(message);
                return Ok(result);
            }
        };

        info!("Importing {} employee rows into department {}", rows.len(), department_id);

        // Sequential on purpose: a repeated stt must see the record written
        // by its earlier occurrence.
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + FIRST_DATA_ROW;
            match self.import_row(row, index + 1, department_id).await {
                Ok(UpsertOutcome::Created(_)) => {
                    result.created += 1;
                    result.success += 1;
                }
                Ok(UpsertOutcome::Updated(_)) => {
                    result.updated += 1;
                    result.success += 1;
                }
                Err(RowError::Store(err)) if err.is_unavailable() => {
                    error!("Import aborted at row {}: {}", row_number, err);
                    result.errors.push(format!("Dòng {}: {}", row_number, err));
                    result.failed += 1;
                    return Err(ImportAborted { partial: result, cause: err });
                }
                Err(err) => {
                    let message = format!("Dòng {}: {}", row_number, err);
                    warn!("{}", message);
                    result.errors.push(message);
                    result.failed += 1;
                }
            }
        }

        info!(
            "Import finished: {} succeeded ({} created, {} updated), {} failed",
            result.success, result.created, result.updated, result.failed
        );
        Ok(result)
    }

    async fn import_row(&self, row: &ImportRow, ordinal: usize, department_id: Uuid) -> Result<UpsertOutcome, RowError> {
        let draft = mapper::map_row(row, ordinal, department_id, &self.dates).map_err(RowError::InvalidStt)?;
        if draft.ho_ten.is_empty() {
            return Err(RowError::MissingName);
        }
        Ok(self.store.upsert_by_stt(&draft).await?)
    }
}
