use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::models::import::{CellValue, ImportRow};

#[derive(Debug, Clone, PartialEq)]
pub struct ReadError(pub String);

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Turns an uploaded workbook into data rows keyed by header text.
pub trait SheetReader: Send + Sync {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, ReadError>;
}

/// Reads the first worksheet of an `.xlsx`/`.xls` workbook. The first row
/// holds the headers; rows without any filled cell are skipped and cells
/// under a blank header are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineReader;

impl SheetReader for CalamineReader {
    fn read_rows(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, ReadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|err| ReadError(err.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReadError("workbook has no worksheet".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| ReadError(err.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(header_text).collect(),
            None => return Ok(Vec::new()),
        };

        let records = rows
            .filter_map(|cells| {
                let record: ImportRow = headers
                    .iter()
                    .zip(cells.iter())
                    .filter(|(header, _)| !header.is_empty())
                    .map(|(header, cell)| (header.clone(), cell_value(cell)))
                    .filter(|(_, value)| !matches!(value, CellValue::Empty))
                    .collect();
                (!record.is_empty()).then_some(record)
            })
            .collect();

        Ok(records)
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => cell_value(other).to_text(),
    }
}

/// Date-formatted cells surface as their serial number, the same shape a
/// plain numeric date cell has.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
