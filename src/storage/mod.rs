// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::report::format::Layout;
use crate::report::join::{table_columns, JoinedRow};
use crate::utils::error::StorageError;
use crate::utils::text::{decode, Encoding};

/// Counts and provenance written next to a table export.
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    pub format: String,
    pub input: String,
    pub output: String,
    pub headers: usize,
    pub skipped_headers: usize,
    pub tables: usize,
    pub proposals: usize,
    pub rows: usize,
    pub extraction_timestamp: String,
}

/// Reads and decodes a report file.
pub fn read_input(path: &Path, encoding: Encoding) -> Result<String, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingInputFile(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(decode(&bytes, encoding))
}

/// Creates the parent directory of `path` if it doesn't exist
fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Writes plain text (the intermediate proposal-blocks artifact).
pub fn save_text(path: &Path, text: &str) -> Result<PathBuf, StorageError> {
    ensure_parent(path)?;
    fs::write(path, text).map_err(StorageError::IoError)?;
    tracing::info!("Saved {} bytes to {}", text.len(), path.display());
    Ok(path.to_path_buf())
}

/// Pretty-printed JSON of any serializable value.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf, StorageError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    ensure_parent(path)?;
    fs::write(path, json).map_err(StorageError::IoError)?;
    tracing::info!("Saved JSON to {}", path.display());
    Ok(path.to_path_buf())
}

/// Saves the joined table: a JSON array of objects for `.json` paths, CSV otherwise.
pub fn save_table(path: &Path, layout: &Layout, rows: &[JoinedRow]) -> Result<PathBuf, StorageError> {
    let columns = table_columns(layout);

    if is_json(path) {
        let objects: Vec<Map<String, Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(row.values(layout))
                    .map(|(column, value)| (column.to_string(), Value::String(value)))
                    .collect()
            })
            .collect();
        return save_json(path, &objects);
    }

    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(row.values(layout))?;
    }
    writer.flush().map_err(StorageError::IoError)?;

    tracing::info!("Saved {} rows to {}", rows.len(), path.display());
    Ok(path.to_path_buf())
}

/// `<output>.meta.json` beside the export.
pub fn metadata_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".meta.json");
    output.with_file_name(name)
}

pub fn save_metadata(output: &Path, metadata: &ExportMetadata) -> Result<PathBuf, StorageError> {
    save_json(&metadata_path(output), metadata)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// CSV of flattened records restricted to `columns`, in that order.
pub fn save_records_csv(
    path: &Path,
    columns: &[String],
    records: &[Map<String, Value>],
) -> Result<PathBuf, StorageError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| cell(record.get(c))))?;
    }
    writer.flush().map_err(StorageError::IoError)?;

    tracing::info!("Saved {} records to {}", records.len(), path.display());
    Ok(path.to_path_buf())
}
