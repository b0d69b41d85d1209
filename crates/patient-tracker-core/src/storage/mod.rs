//! Storage layer: a key-value slot holding serialized data.
//!
//! The tracker keeps its whole patient list under one key. Any backend that can
//! get and set a string by key will do.

mod file;
mod memory;
mod schema;
mod sqlite;

pub use file::*;
pub use memory::*;
pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string slot addressed by key.
pub trait KeyValueSlot {
    /// Read the value under `key`, `None` if never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}
