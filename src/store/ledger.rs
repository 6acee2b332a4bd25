// src/store/ledger.rs

//! Blocking CSV primitives behind `CsvStore`. Callers run them on the
//! blocking pool.

use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use crate::models::question::QuestionEntry;

use super::StoreError;

/// Exact column names a question file must carry.
pub const QUESTION_FILE_HEADER: [&str; 2] = ["Question", "Marks"];

/// Headers plus data rows of a ledger, in file order.
pub type Table = (Vec<String>, Vec<Vec<String>>);

/// Appends `row` to the ledger at `path`, writing `header` first when the
/// file is new or empty.
pub fn append_row(path: &Path, header: &[&str], row: &[&str]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(file);

    if is_empty {
        writer.write_record(header)?;
    }
    writer.write_record(row)?;
    writer.flush()?;

    Ok(())
}

/// Reads a whole ledger. `Ok(None)` when the file does not exist yet.
///
/// Rows may be shorter or longer than the header.
pub fn read_table(path: &Path) -> Result<Option<Table>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(Some((headers, rows)))
}

/// Writes a fresh question file, replacing any previous one.
pub fn write_questions(path: &Path, questions: &[QuestionEntry]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(QUESTION_FILE_HEADER)?;
    for q in questions {
        writer.write_record([q.question.as_str(), q.marks.as_str()])?;
    }
    writer.flush()?;

    Ok(())
}

/// Loads a question file in file order.
///
/// Returns `None` when the file is absent, lacks a `Question` or `Marks`
/// column, or cannot be parsed. The reason is logged.
pub fn read_questions(path: &Path) -> Option<Vec<QuestionEntry>> {
    if !path.exists() {
        tracing::warn!("Questions file not found: {}", path.display());
        return None;
    }

    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::error!("Error reading the questions file {}: {}", path.display(), e);
            return None;
        }
    };

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            tracing::error!("Error reading the questions file {}: {}", path.display(), e);
            return None;
        }
    };

    let missing: Vec<&str> = QUESTION_FILE_HEADER
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            "Missing columns in {}: {:?}. Found columns: {:?}",
            path.display(),
            missing,
            headers.iter().collect::<Vec<_>>()
        );
        return None;
    }

    match reader.deserialize().collect::<Result<Vec<QuestionEntry>, _>>() {
        Ok(questions) => Some(questions),
        Err(e) => {
            tracing::error!("Error reading the questions file {}: {}", path.display(), e);
            None
        }
    }
}
