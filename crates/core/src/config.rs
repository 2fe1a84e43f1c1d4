//! # Configuration
//!
//! Where the catalog lives and which backend stores it. Defaults can be
//! overridden from the environment; front ends may override further.

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::catalog::{CatalogManager, SystemClock, STORAGE_KEY};
use crate::state::io::{get_data_path, DATA_PATH_ENV};
use crate::state::{FileStore, KeyValueStore, MemoryStore, SqliteStore};

/// Environment variable selecting the storage backend
pub const BACKEND_ENV: &str = "BOOKSHELF_BACKEND";

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "bookshelf.db";

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Non-persistent, for tests and dry runs
    Memory,
    /// One JSON file per key
    File,
    /// SQLite database file
    #[default]
    Sqlite,
}

impl StorageBackend {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => anyhow::bail!("Unknown storage backend: {}", other),
        }
    }
}

/// Configuration for opening a catalog
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Storage backend to use
    pub backend: StorageBackend,
    /// Directory for the database or JSON files
    pub data_dir: PathBuf,
    /// Key the collection is stored under
    pub storage_key: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            data_dir: get_data_path(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides from `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(DATA_PATH_ENV).filter(|p| !p.is_empty()) {
            config.data_dir = PathBuf::from(path);
        }

        if let Some(backend) = lookup(BACKEND_ENV).filter(|b| !b.is_empty()) {
            config.backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", BACKEND_ENV))?;
        }

        Ok(config)
    }

    /// Open the configured store
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = match self.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::File => Arc::new(FileStore::new(&self.data_dir)),
            StorageBackend::Sqlite => {
                Arc::new(SqliteStore::open_at(self.data_dir.join(DATABASE_FILE))?)
            }
        };

        tracing::debug!(backend = %self.backend, data_dir = ?self.data_dir, "Storage opened");
        Ok(store)
    }

    /// Open the store and load the catalog from it
    pub fn open_manager(&self) -> Result<CatalogManager> {
        let store = self.open_store()?;
        Ok(CatalogManager::load_with(
            store,
            self.storage_key.clone(),
            Arc::new(SystemClock),
        ))
    }
}
