use crate::models::PatientRecord;

use super::{PatientStore, StoreResult};

/// Volatile store, used by tests and `store.backend = "memory"`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<PatientRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }
}

impl PatientStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<PatientRecord>> {
        Ok(self.records.clone())
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<PatientRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn insert(&mut self, record: PatientRecord) -> StoreResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn replace(&mut self, record: PatientRecord) -> StoreResult<bool> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
