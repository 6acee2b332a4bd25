// src/evaluation/results.rs

//! Converts a tabular artifact into JSON records keyed by its header row.
//!
//! Keys keep the column order of the file; cells missing from a short row
//! come back as `null`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use serde_json::{Map, Value};

use crate::error::AppError;

use super::has_extension;

/// Extensions `read_records` understands.
pub fn is_tabular(file_name: &str) -> bool {
    has_extension(file_name, "xlsx") || has_extension(file_name, "csv")
}

/// Reads the first worksheet (or the CSV file) at `path` into records.
///
/// Blocking; run it on the blocking pool.
pub fn read_records(path: &Path) -> Result<Vec<Map<String, Value>>, AppError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if has_extension(name, "csv") {
        read_csv_records(path)
    } else {
        read_sheet_records(path)
    }
}

fn read_sheet_records(path: &Path) -> Result<Vec<Map<String, Value>>, AppError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let records: Vec<Map<String, Value>> = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, h)| (h.clone(), row.get(idx).map_or(Value::Null, cell_to_json)))
                .collect()
        })
        .collect();
    Ok(records)
}

fn read_csv_records(path: &Path) -> Result<Vec<Map<String, Value>>, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Map<String, Value> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let value = row
                    .get(idx)
                    .map_or(Value::Null, |v| Value::String(v.to_string()));
                (h.to_string(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn cell_to_json(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}
