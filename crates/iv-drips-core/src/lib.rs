//! IV Drips Core Library
//!
//! Ward IV-drip monitoring: canonical infusion records behind a small
//! authenticated registry, and a client-side simulation that drains each bag
//! from its flow rate between fetches.
//!
//! # Architecture
//!
//! ```text
//!   signup/login ──► AuthService ──► bearer token
//!                                        │
//!   create/update ──────────────► Registry ──► PatientStore (snapshot | sqlite | memory)
//!                                        │
//!                                  list / demo data
//!                                        │
//!                                        ▼
//!                              Dashboard (client side)
//!                                        │
//!                              tick every 1 s (1x live, 100x demo)
//!                                        │
//!                          volume ▸ drip level ▸ time remaining
//! ```
//!
//! # Core Principle
//!
//! **The stored record is canonical.** Simulated volume lives only in the
//! client session and is thrown away on every refetch.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, Saline, create/update payloads)
//! - [`simulation`]: Drip depletion engine and its cancellable ticker
//! - [`store`]: Persistence backends (JSON snapshot, SQLite, memory)
//! - [`registry`]: Create/read/update rules and demo data
//! - [`auth`]: Users, local tokens and external identity tokens
//! - [`dashboard`]: Presentation model (search, cards, form checks)

pub mod auth;
pub mod dashboard;
pub mod models;
pub mod registry;
pub mod simulation;
pub mod store;

// Re-export commonly used types
pub use auth::{AuthError, AuthService, Credential, CredentialKind, Identity};
pub use dashboard::{Dashboard, DripStatus, PatientCard, PatientForm, SaveRequest};
pub use models::{DemoPatient, NewPatient, PatientRecord, PatientUpdate, Saline};
pub use registry::{Registry, RegistryError};
pub use simulation::{advance, tick, DripPhase, DripState, SpeedMode, Ticker};
pub use store::{MemoryStore, PatientStore, SnapshotStore, SqliteStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum IvDripsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for IvDripsError {
    fn from(e: serde_json::Error) -> Self {
        IvDripsError::SerializationError(e.to_string())
    }
}

impl From<dashboard::SaveRejected> for IvDripsError {
    fn from(e: dashboard::SaveRejected) -> Self {
        IvDripsError::Rejected(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create a monitor session in live or demonstration mode.
#[uniffi::export]
pub fn new_drip_monitor(demo: bool) -> Arc<DripMonitor> {
    Arc::new(DripMonitor {
        dashboard: Arc::new(Mutex::new(Dashboard::new(speed_mode(demo)))),
    })
}

fn speed_mode(demo: bool) -> SpeedMode {
    if demo {
        SpeedMode::Demonstration
    } else {
        SpeedMode::Live
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe dashboard wrapper for FFI. The host owns networking and the
/// 1-second timer; this object owns the state.
#[derive(uniffi::Object)]
pub struct DripMonitor {
    dashboard: Arc<Mutex<Dashboard>>,
}

impl DripMonitor {
    fn dashboard(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl DripMonitor {
    // =========================================================================
    // Fetch Results
    // =========================================================================

    /// Replace the list with a fetched JSON array. Malformed entries degrade
    /// to defaults; a body that is not an array is rejected and the current
    /// list kept. Returns the number of monitors loaded.
    pub fn load_json(&self, json: String) -> Result<u32, IvDripsError> {
        let body: serde_json::Value = serde_json::from_str(&json)?;
        let records = body.as_array().ok_or_else(|| {
            IvDripsError::InvalidInput("expected a JSON array of patients".to_string())
        })?;
        let mut dashboard = self.dashboard();
        dashboard.load_values(records);
        Ok(dashboard.patients().len() as u32)
    }

    /// Record a failed network call for display.
    pub fn report_error(&self, context: String, message: String) {
        self.dashboard().report_error(&context, message);
    }

    /// Pending user notifications, oldest first.
    pub fn take_notifications(&self) -> Vec<String> {
        self.dashboard().take_notifications()
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one 1-second tick.
    pub fn tick(&self) {
        self.dashboard().tick();
    }

    /// Advance by an arbitrary wall-clock interval, e.g. after the app resumes.
    pub fn advance(&self, elapsed_seconds: f64) {
        self.dashboard().advance(elapsed_seconds);
    }

    // =========================================================================
    // View State
    // =========================================================================

    /// Switch modes. Returns true if the host must refetch.
    pub fn set_demo_mode(&self, demo: bool) -> bool {
        self.dashboard().set_mode(speed_mode(demo))
    }

    pub fn is_demo_mode(&self) -> bool {
        self.dashboard().mode().is_demo()
    }

    /// API path to fetch for the current mode.
    pub fn source_path(&self) -> String {
        self.dashboard().source_path().to_string()
    }

    pub fn set_search(&self, term: String) {
        self.dashboard().set_search(&term);
    }

    /// Visible monitor tiles.
    pub fn cards(&self) -> Vec<FfiPatientCard> {
        self.dashboard().cards().into_iter().map(Into::into).collect()
    }

    // =========================================================================
    // Saving
    // =========================================================================

    /// Validate a form and build the HTTP request to send.
    pub fn prepare_save(&self, form: FfiPatientForm) -> Result<FfiSaveRequest, IvDripsError> {
        let form: PatientForm = form.into();
        let request = self.dashboard().prepare_save(&form)?;

        Ok(match request {
            SaveRequest::Create(fields) => FfiSaveRequest {
                method: "POST".to_string(),
                path: dashboard::PATIENTS_PATH.to_string(),
                body_json: serde_json::to_string(&fields)?,
            },
            SaveRequest::Update { id, fields } => FfiSaveRequest {
                method: "PUT".to_string(),
                path: format!("{}/{}", dashboard::PATIENTS_PATH, id),
                body_json: serde_json::to_string(&fields)?,
            },
        })
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe monitor tile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientCard {
    pub id: i64,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: String,
    pub rate_line: String,
    pub volume_line: String,
    pub time_remaining: String,
    pub level_percent: u8,
    pub status: String,
}

impl From<PatientCard> for FfiPatientCard {
    fn from(card: PatientCard) -> Self {
        Self {
            id: card.id,
            name: card.name,
            ward: card.ward,
            bed: card.bed,
            saline: card.saline,
            rate_line: card.rate_line,
            volume_line: card.volume_line,
            time_remaining: card.time_remaining,
            level_percent: card.level_percent,
            status: format!("{:?}", card.status),
        }
    }
}

/// FFI-safe add/edit form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub editing_id: Option<i64>,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: String,
    pub total_volume: String,
    pub rate: String,
}

impl From<FfiPatientForm> for PatientForm {
    fn from(form: FfiPatientForm) -> Self {
        PatientForm {
            editing_id: form.editing_id,
            name: form.name,
            ward: form.ward,
            bed: form.bed,
            saline: form.saline,
            total_volume: form.total_volume,
            rate: form.rate,
        }
    }
}

/// FFI-safe HTTP request description.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSaveRequest {
    pub method: String,
    pub path: String,
    pub body_json: String,
}
