pub mod db;
pub mod io;
pub mod store;

pub use db::SqliteStore;
pub use io::FileStore;
pub use store::{KeyValueStore, MemoryStore};
