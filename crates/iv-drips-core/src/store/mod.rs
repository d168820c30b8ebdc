//! Persistence backends for patient records.
//!
//! The registry only sees [`PatientStore`]; the server picks a backend at
//! startup. Every backend replaces a record wholesale; there is no
//! cross-request conflict detection.

mod memory;
mod schema;
mod snapshot;
mod sqlite;

pub use memory::*;
pub use schema::*;
pub use snapshot::*;
pub use sqlite::*;

use thiserror::Error;

use crate::models::PatientRecord;

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository of canonical patient records.
pub trait PatientStore: Send {
    /// All records in insertion order.
    fn list(&self) -> StoreResult<Vec<PatientRecord>>;

    fn find_by_id(&self, id: i64) -> StoreResult<Option<PatientRecord>>;

    fn insert(&mut self, record: PatientRecord) -> StoreResult<()>;

    /// Replace the record with the same id. Returns false if none matched.
    fn replace(&mut self, record: PatientRecord) -> StoreResult<bool>;

    /// Highest id currently stored.
    fn max_id(&self) -> StoreResult<Option<i64>> {
        Ok(self.list()?.iter().map(|r| r.id).max())
    }
}

impl<S: PatientStore + ?Sized> PatientStore for Box<S> {
    fn list(&self) -> StoreResult<Vec<PatientRecord>> {
        (**self).list()
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<PatientRecord>> {
        (**self).find_by_id(id)
    }

    fn insert(&mut self, record: PatientRecord) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn replace(&mut self, record: PatientRecord) -> StoreResult<bool> {
        (**self).replace(record)
    }

    fn max_id(&self) -> StoreResult<Option<i64>> {
        (**self).max_id()
    }
}
