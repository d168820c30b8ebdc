//! SQLite-backed patient store.

use std::path::Path;

use rusqlite::{params, Connection, Row};

use crate::models::{PatientRecord, Saline};

use super::{PatientStore, StoreResult, SCHEMA};

/// Patient store on a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open database at path, creating it and its directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
        let saline: String = row.get(4)?;
        Ok(PatientRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            ward: row.get(2)?,
            bed: row.get(3)?,
            saline: Saline::from_label(&saline),
            total_volume: row.get(5)?,
            rate: row.get(6)?,
            current_volume: row.get(7)?,
            drip_level: row.get(8)?,
            start_time: row.get(9)?,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, ward, bed, saline, total_volume, rate,
           current_volume, drip_level, start_time
    FROM patients
"#;

impl PatientStore for SqliteStore {
    fn list(&self) -> StoreResult<Vec<PatientRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<PatientRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE id = ?", SELECT_COLUMNS))?;
        let mut rows = stmt.query_map([id], Self::row_to_record)?;

        match rows.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    fn insert(&mut self, record: PatientRecord) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, ward, bed, saline, total_volume, rate,
                current_volume, drip_level, start_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.id,
                record.name,
                record.ward,
                record.bed,
                record.saline.label(),
                record.total_volume,
                record.rate,
                record.current_volume,
                record.drip_level,
                record.start_time,
            ],
        )?;
        Ok(())
    }

    fn replace(&mut self, record: PatientRecord) -> StoreResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?, ward = ?, bed = ?, saline = ?, total_volume = ?,
                rate = ?, current_volume = ?, drip_level = ?, start_time = ?
            WHERE id = ?
            "#,
            params![
                record.name,
                record.ward,
                record.bed,
                record.saline.label(),
                record.total_volume,
                record.rate,
                record.current_volume,
                record.drip_level,
                record.start_time,
                record.id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    fn max_id(&self) -> StoreResult<Option<i64>> {
        let max = self
            .conn
            .query_row("SELECT MAX(id) FROM patients", [], |row| row.get(0))?;
        Ok(max)
    }
}
