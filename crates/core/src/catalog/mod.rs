//! # Catalog
//!
//! Book records, the state manager that owns them, and everything derived
//! from the collection.

pub mod book;
pub mod clock;
pub mod manager;
pub mod query;
pub mod seed;
pub mod transfer;
pub mod validation;

pub use book::{Book, BookId, BookRecord, Loan, NewBook};
pub use clock::{Clock, FixedClock, SystemClock};
pub use manager::{CatalogManager, STORAGE_KEY};
pub use query::{CatalogStats, SortDirection, SortField, SortOptions};
pub use transfer::ExportFile;
