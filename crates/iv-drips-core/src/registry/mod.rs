//! Patient registry: create/read/update over canonical infusion records.
//!
//! The registry owns stored fields (identity, rate, bag volume). Simulated
//! fields are derived elsewhere and never written back through here.

mod demo;

pub use demo::*;

use thiserror::Error;
use tracing::info;

use crate::models::{NewPatient, PatientRecord, PatientUpdate, Saline};
use crate::store::{PatientStore, StoreError};

/// Log target for registry events.
pub const REGISTRY: &str = "registry";

/// Registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("Patient not found: {0}")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Source of creation timestamps, in epoch milliseconds.
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// CRUD surface over a [`PatientStore`].
pub struct Registry<S> {
    store: S,
    clock: Clock,
}

impl<S: PatientStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_clock)
    }

    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Every record, unfiltered.
    pub fn list(&self) -> RegistryResult<Vec<PatientRecord>> {
        Ok(self.store.list()?)
    }

    pub fn find_by_id(&self, id: i64) -> RegistryResult<PatientRecord> {
        self.store.find_by_id(id)?.ok_or(RegistryError::NotFound(id))
    }

    /// Validate, assign an id and defaults, and persist a full-bag record.
    pub fn create(&mut self, fields: NewPatient) -> RegistryResult<PatientRecord> {
        let missing = fields.missing_fields();
        if !missing.is_empty() {
            return Err(RegistryError::Validation { missing });
        }

        let now = (self.clock)();
        let id = self.next_id(now)?;
        let total_volume = fields.total_volume_or_default();
        let rate = fields.rate_or_default();

        let text = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        let saline = Saline::from_label(&text(fields.saline));
        let record = PatientRecord::new(
            id,
            text(fields.name),
            text(fields.ward),
            text(fields.bed),
            saline,
            total_volume,
            rate,
            now,
        );

        self.store.insert(record.clone())?;
        info!(target: REGISTRY, patient_id = id, ward = %record.ward, "created monitor");
        Ok(record)
    }

    /// Merge `fields` over the stored record with `id` and persist it.
    pub fn update(&mut self, id: i64, fields: PatientUpdate) -> RegistryResult<PatientRecord> {
        let existing = self.find_by_id(id)?;
        let merged = fields.merge_into(&existing);

        if !self.store.replace(merged.clone())? {
            return Err(RegistryError::NotFound(id));
        }

        info!(target: REGISTRY, patient_id = id, "updated monitor");
        Ok(merged)
    }

    /// Fixed sample records for the unauthenticated demonstration view.
    pub fn demo_data(&self) -> Vec<crate::models::DemoPatient> {
        demo_patients()
    }

    /// Creation timestamp, bumped past the newest id so ids stay unique and
    /// increasing even within one millisecond.
    fn next_id(&self, now: i64) -> RegistryResult<i64> {
        Ok(match self.store.max_id()? {
            Some(max) if max >= now => max + 1,
            _ => now,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
