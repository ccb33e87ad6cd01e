//! Database layer - store traits and their backends

pub mod memory;
pub mod postgres;
pub mod search;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::{PostgresContentStore, PostgresHistoryStore};
pub use traits::{ContentStore, DirectoryStore, HistoryStore};
