//! # Import / Export
//!
//! Serialization boundary for backups. Exports hand back the persisted payload
//! verbatim; imports must pass structural checks before they may replace it.

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::book::{Book, BookRecord};
use crate::error::{CatalogError, CatalogResult};
use crate::state::io::write_file;
use crate::state::KeyValueStore;

pub const NOT_AN_ARRAY: &str =
    "Invalid data format: The imported file must contain an array of books";
pub const MISSING_FIELDS: &str = "Invalid data format: The book data is missing required fields";
pub const PARSE_FAILED: &str =
    "Failed to parse the imported file. Please make sure it's a valid JSON file.";

/// A backup ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    /// Write the backup into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        write_file(&path, &self.contents)
            .with_context(|| format!("Failed to export library to {:?}", path))?;
        Ok(path)
    }
}

/// `library-export-YYYY-MM-DD.json`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("library-export-{}.json", today.format("%Y-%m-%d"))
}

/// Package whatever is persisted under `key`; `None` when nothing is stored
pub fn export(
    store: &dyn KeyValueStore,
    key: &str,
    today: NaiveDate,
) -> CatalogResult<Option<ExportFile>> {
    let stored = store.get(key).map_err(CatalogError::Persistence)?;

    Ok(stored.map(|contents| ExportFile {
        file_name: export_file_name(today),
        contents,
    }))
}

fn has_required_fields(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let is_string = |name: &str| object.get(name).is_some_and(Value::is_string);

    is_string("id")
        && is_string("title")
        && is_string("author")
        && object.get("isCheckedOut").is_some_and(Value::is_boolean)
}

/// Check an import payload and decode its books.
///
/// The payload must be a JSON array whose elements all carry string `id`,
/// `title`, `author` and a boolean `isCheckedOut`.
pub fn validate_import(payload: &str) -> CatalogResult<Vec<Book>> {
    let parsed: Value =
        serde_json::from_str(payload).map_err(|_| CatalogError::Import(PARSE_FAILED.to_string()))?;

    let Some(items) = parsed.as_array() else {
        return Err(CatalogError::Import(NOT_AN_ARRAY.to_string()));
    };

    if !items.iter().all(has_required_fields) {
        return Err(CatalogError::Import(MISSING_FIELDS.to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Book::deserialize(item).map_err(|e| {
                CatalogError::Import(format!(
                    "Invalid data format: book #{} ({}): {}",
                    index + 1,
                    item["id"].as_str().unwrap_or_default(),
                    e
                ))
            })
        })
        .collect()
}

/// JSON Schema describing an import file
pub fn import_schema() -> schemars::Schema {
    schemars::schema_for!(Vec<BookRecord>)
}
