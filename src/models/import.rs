use std::collections::HashMap;
use serde::Serialize;
use chrono::{DateTime, Utc};

/// Raw spreadsheet cell, as handed over by a sheet reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl CellValue {
    /// Mirrors spreadsheet truthiness: empty text, zero and `false` count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !*b,
            CellValue::Date(_) => false,
        }
    }

    /// Text rendering that keeps long numeric identifiers intact
    /// (`84912345678.0` becomes `"84912345678"`).
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

/// One spreadsheet data row keyed by header label.
pub type ImportRow = HashMap<String, CellValue>;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    pub success: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}
