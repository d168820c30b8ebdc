//! Flat JSON snapshot store.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::models::PatientRecord;

use super::{PatientStore, StoreResult};

/// Log target for persistence events.
pub const PERSISTENCE: &str = "persistence";

/// Keeps every record in memory and rewrites the whole JSON array on each
/// mutation.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    records: Vec<PatientRecord>,
}

impl SnapshotStore {
    /// Open the snapshot at `path`, creating an empty one if absent.
    ///
    /// Entries are rebuilt one by one, so a single odd record never costs the
    /// rest. A file that is not a JSON array is copied to `<path>.corrupt`
    /// and the store starts empty; the next write replaces the original.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "[]")?;
            info!(target: PERSISTENCE, path = %path.display(), "created empty snapshot");
            return Ok(Self {
                path,
                records: Vec::new(),
            });
        }

        let records = match Self::read(&path) {
            Ok(records) => records,
            Err(err) => {
                let quarantine = sibling(&path, "corrupt");
                fs::copy(&path, &quarantine)?;
                warn!(
                    target: PERSISTENCE,
                    path = %path.display(),
                    copy = %quarantine.display(),
                    error = %err,
                    "snapshot unreadable, starting with no patients"
                );
                Vec::new()
            }
        };

        info!(target: PERSISTENCE, path = %path.display(), count = records.len(), "loaded snapshot");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> StoreResult<Vec<PatientRecord>> {
        let raw = fs::read_to_string(path)?;
        let entries: Vec<Value> = serde_json::from_str(&raw)?;

        let records = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let record = PatientRecord::from_value(entry);
                if record.is_none() {
                    warn!(target: PERSISTENCE, index, "dropping snapshot entry without a usable id");
                }
                record
            })
            .collect();
        Ok(records)
    }

    /// Write `records` to a sibling temp file, then rename over the snapshot.
    fn persist(&self, records: &[PatientRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = sibling(&self.path, "tmp");

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy of the collection; commit it only once the
    /// snapshot is on disk.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Vec<PatientRecord>) -> T,
    ) -> StoreResult<T> {
        let mut next = self.records.clone();
        let outcome = change(&mut next);
        self.persist(&next)?;
        self.records = next;
        Ok(outcome)
    }
}

/// `<path>.<suffix>` next to the snapshot.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl PatientStore for SnapshotStore {
    fn list(&self) -> StoreResult<Vec<PatientRecord>> {
        Ok(self.records.clone())
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<PatientRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn insert(&mut self, record: PatientRecord) -> StoreResult<()> {
        self.commit(|records| records.push(record))
    }

    fn replace(&mut self, record: PatientRecord) -> StoreResult<bool> {
        if !self.records.iter().any(|r| r.id == record.id) {
            return Ok(false);
        }

        self.commit(|records| {
            if let Some(slot) = records.iter_mut().find(|r| r.id == record.id) {
                *slot = record;
            }
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Saline;
    use tempfile::tempdir;

    fn record(id: i64) -> PatientRecord {
        PatientRecord::new(
            id,
            format!("Patient {}", id),
            "ICU".into(),
            "B-01".into(),
            Saline::RingerLactate,
            500,
            50,
            id,
        )
    }

    #[test]
    fn test_creates_empty_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("patients.json");

        let store = SnapshotStore::open(&path).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.json");

        {
            let mut store = SnapshotStore::open(&path).unwrap();
            store.insert(record(1)).unwrap();
            store.insert(record(2)).unwrap();
            let mut edited = record(2);
            edited.ward = "HDU".into();
            assert!(store.replace(edited).unwrap());
        }

        let reopened = SnapshotStore::open(&path).unwrap();
        let records = reopened.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ward, "HDU");
        assert_eq!(reopened.max_id().unwrap(), Some(2));
    }

    #[test]
    fn test_corrupt_snapshot_is_copied_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = SnapshotStore::open(&path).unwrap();
        assert!(store.list().unwrap().is_empty());

        store.insert(record(1)).unwrap();
        let copy = dir.path().join("patients.json.corrupt");
        assert_eq!(fs::read_to_string(copy).unwrap(), "{ not json");
    }

    #[test]
    fn test_string_numbers_do_not_discard_other_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.json");
        fs::write(
            &path,
            r#"[
                {"id": 1, "name": "John Doe", "ward": "ICU", "bed": "1",
                 "saline": "Normal Saline", "totalVolume": 500, "rate": 50,
                 "currentVolume": 500, "dripLevel": 100, "startTime": 1},
                {"id": 2, "name": "Jane Smith", "ward": "General", "bed": "4",
                 "saline": "Dextrose 5%", "totalVolume": "1000", "rate": "60",
                 "currentVolume": 1000, "dripLevel": 100, "startTime": 2},
                {"name": "no id"}
            ]"#,
        )
        .unwrap();

        let mut store = SnapshotStore::open(&path).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].total_volume, 1000);
        assert_eq!(records[1].rate, 60);

        store.insert(record(3)).unwrap();
        let reopened = SnapshotStore::open(&path).unwrap();
        let ids: Vec<i64> = reopened.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!dir.path().join("patients.json.corrupt").exists());
    }

    #[test]
    fn test_replace_unknown_id_does_not_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.json");
        let mut store = SnapshotStore::open(&path).unwrap();

        assert!(!store.replace(record(9)).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_snapshot_is_a_plain_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("patients.json");
        let mut store = SnapshotStore::open(&path).unwrap();
        store.insert(record(5)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["id"], 5);
        assert_eq!(raw[0]["saline"], "Ringer Lactate");
    }
}
