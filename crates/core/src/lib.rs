//! # Bookshelf Core
//!
//! Catalog state for a personal or small-institution library: book records,
//! loans, derived views and the storage they persist to.
//!
//! ## Architecture
//!
//! - `catalog/` - Book model, `CatalogManager`, queries, validation, import/export
//! - `state/` - Key-value storage backends (memory, JSON files, SQLite)
//! - `config` - Backend and data directory selection
//! - `error` - `CatalogError` taxonomy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookshelf_core::config::CatalogConfig;
//! use bookshelf_core::catalog::{SortOptions, NewBook};
//!
//! let mut catalog = CatalogConfig::from_env()?.open_manager()?;
//! catalog.add_book(NewBook { title: "Emma".into(), author: "Jane Austen".into(), ..Default::default() })?;
//! let listing = catalog.filter_and_sort("austen", SortOptions::default(), None);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod state;

pub use catalog::{Book, BookId, CatalogManager, NewBook};
pub use error::{CatalogError, CatalogResult};
