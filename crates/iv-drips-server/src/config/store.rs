use super::DEFAULT_SNAPSHOT_PATH;
use iv_drips_core::store::{MemoryStore, PatientStore, SnapshotStore, SqliteStore, StoreResult};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_backend")]
    pub backend: StoreBackend,

    /// Snapshot file or SQLite database, depending on the backend
    #[serde(default = "StoreConfig::default_path")]
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[serde(alias = "Snapshot", alias = "SNAPSHOT")]
    Snapshot,
    #[serde(alias = "Sqlite", alias = "SQLITE")]
    Sqlite,
    /// Nothing survives a restart
    #[serde(alias = "Memory", alias = "MEMORY")]
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreConfig::default_backend(),
            path: StoreConfig::default_path(),
        }
    }
}

impl StoreConfig {
    pub fn default_backend() -> StoreBackend {
        StoreBackend::Snapshot
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_SNAPSHOT_PATH)
    }

    pub fn open(&self) -> StoreResult<Box<dyn PatientStore>> {
        Ok(match self.backend {
            StoreBackend::Snapshot => Box::new(SnapshotStore::open(&self.path)?),
            StoreBackend::Sqlite => Box::new(SqliteStore::open(&self.path)?),
            StoreBackend::Memory => Box::new(MemoryStore::new()),
        })
    }
}
