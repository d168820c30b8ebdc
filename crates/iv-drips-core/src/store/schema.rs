//! SQLite schema definition.

/// Schema for the SQLite patient store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY,                      -- creation time, epoch ms
    name TEXT NOT NULL,
    ward TEXT NOT NULL,
    bed TEXT NOT NULL,
    saline TEXT NOT NULL,                        -- ward label, e.g. 'Normal Saline'
    total_volume INTEGER NOT NULL,               -- ml
    rate INTEGER NOT NULL,                       -- ml/hour
    current_volume INTEGER NOT NULL,             -- ml
    drip_level REAL NOT NULL,                    -- percent
    start_time INTEGER NOT NULL                  -- epoch ms
);

CREATE INDEX IF NOT EXISTS idx_patients_ward ON patients(ward);
"#;
