//! Persistence backends for the activity log.

mod json_file;
mod jsonl;
mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use activity_types::{ActivityBackend, StoreError};
pub use json_file::JsonFileBackend;
pub use jsonl::JsonlBackend;
pub use memory::InMemoryBackend;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
