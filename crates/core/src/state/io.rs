//! # IO Utilities
//!
//! File system operations for the `.bookshelf` data directory, and a
//! key-value store that keeps one JSON file per key inside it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::store::KeyValueStore;

/// Environment variable that overrides the data directory
pub const DATA_PATH_ENV: &str = "BOOKSHELF_DATA_PATH";

/// Get the data directory path (.bookshelf)
///
/// This is the primary storage location for all Bookshelf files.
pub fn get_data_path() -> PathBuf {
    // Check for environment variable override
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".bookshelf")
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create data directory: {:?}", path))
}

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
}

/// Read a file as text
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

/// Store that maps each key to `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            anyhow::bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        read_file(&path).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write beside the target and rename so a crash never leaves half a payload
        let tmp = path.with_extension("json.tmp");
        write_file(&tmp, value)?;
        fs::rename(&tmp, &path).with_context(|| format!("Failed to replace file: {:?}", path))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove file: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_path() {
        if std::env::var(DATA_PATH_ENV).is_err() {
            assert!(get_data_path().ends_with(".bookshelf"));
        }
    }

    #[test]
    fn test_file_store_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        // Missing key
        assert_eq!(store.get("library-books").unwrap(), None);

        // Write creates the directory
        store.set("library-books", "[]").unwrap();
        assert!(store.dir().join("library-books.json").exists());

        // Read
        assert_eq!(store.get("library-books").unwrap().as_deref(), Some("[]"));

        // Remove is idempotent
        store.remove("library-books").unwrap();
        store.remove("library-books").unwrap();
        assert_eq!(store.get("library-books").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("a/b").is_err());
        assert!(store.get("").is_err());
    }
}
