//! Dashboard presentation model.
//!
//! Holds what a ward screen shows: the fetched monitors with their simulated
//! drip state, the search term and pending user notifications. Networking is
//! left to the host; results are handed in through [`Dashboard::apply_fetch`].
//!
//! ```text
//!   mode toggle / save ──► fetch (host) ──► apply_fetch ──► load (reset state)
//!                                                │
//!                                          tick every 1 s
//!                                                │
//!                                      cards() filtered by search
//! ```

mod card;
mod form;
mod search;

pub use card::*;
pub use form::*;
pub use search::*;

use std::fmt::Display;

use serde_json::Value;
use tracing::warn;

use crate::models::{parse_int, DemoPatient, PatientRecord};
use crate::simulation::{advance, DripState, SpeedMode, TICK_INTERVAL};

/// API path listing canonical records (bearer auth).
pub const PATIENTS_PATH: &str = "/api/patients";
/// API path listing demonstration records (no auth).
pub const DEMO_DATA_PATH: &str = "/api/demo-data";

/// A monitor as displayed: identity plus simulated drip state.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredPatient {
    pub id: i64,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: String,
    pub drip: DripState,
}

impl MonitoredPatient {
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            ward: record.ward.clone(),
            bed: record.bed.clone(),
            saline: record.saline.label().to_string(),
            drip: DripState::from_record(record),
        }
    }

    /// Build from an untyped record; missing text becomes empty and numeric
    /// fields fall back to defaults.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: value.get("id").and_then(parse_int).unwrap_or_default(),
            name: text("name"),
            ward: text("ward"),
            bed: text("bed"),
            saline: text("saline"),
            drip: DripState::from_value(value),
        }
    }
}

/// Dashboard state for one signed-in session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    mode: SpeedMode,
    patients: Vec<MonitoredPatient>,
    search: String,
    notifications: Vec<String>,
}

impl Dashboard {
    pub fn new(mode: SpeedMode) -> Self {
        Self {
            mode,
            patients: Vec::new(),
            search: String::new(),
            notifications: Vec::new(),
        }
    }

    pub fn mode(&self) -> SpeedMode {
        self.mode
    }

    /// Switch live/demonstration. Returns true if the mode changed, in which
    /// case the current list is dropped and the host must refetch from
    /// [`Dashboard::source_path`].
    pub fn set_mode(&mut self, mode: SpeedMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.patients.clear();
        true
    }

    /// Where the host should fetch the list for the current mode.
    pub fn source_path(&self) -> &'static str {
        if self.mode.is_demo() {
            DEMO_DATA_PATH
        } else {
            PATIENTS_PATH
        }
    }

    /// Whether the fetch for the current mode needs a bearer token.
    pub fn requires_auth(&self) -> bool {
        !self.mode.is_demo()
    }

    /// Replace all state with freshly fetched canonical records.
    pub fn load(&mut self, records: &[PatientRecord]) {
        self.patients = records.iter().map(MonitoredPatient::from_record).collect();
    }

    pub fn load_demo(&mut self, records: &[DemoPatient]) {
        self.patients = records
            .iter()
            .map(|demo| MonitoredPatient::from_record(&demo.record))
            .collect();
    }

    /// Replace all state from untyped records, degrading malformed entries.
    pub fn load_values(&mut self, records: &[Value]) {
        self.patients = records.iter().map(MonitoredPatient::from_value).collect();
    }

    /// Apply a fetch outcome. Failures become a notification and leave the
    /// current list untouched.
    pub fn apply_fetch<E: Display>(&mut self, result: Result<Vec<PatientRecord>, E>) {
        match result {
            Ok(records) => self.load(&records),
            Err(err) => self.report_error("Error fetching data", err),
        }
    }

    /// Surface a failed call to the user.
    pub fn report_error<E: Display>(&mut self, context: &str, err: E) {
        let message = format!("{}: {}", context, err);
        warn!(%message, "dashboard error");
        self.notifications.push(message);
    }

    /// Drain pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    /// One timer tick at the current mode's speed.
    pub fn tick(&mut self) {
        self.advance(TICK_INTERVAL.as_secs_f64());
    }

    /// Advance every monitor by `elapsed_seconds` of wall clock.
    pub fn advance(&mut self, elapsed_seconds: f64) {
        let states: Vec<DripState> = self.patients.iter().map(|p| p.drip.clone()).collect();
        let next = advance(&states, elapsed_seconds, self.mode.multiplier());
        for (patient, drip) in self.patients.iter_mut().zip(next) {
            patient.drip = drip;
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn patients(&self) -> &[MonitoredPatient] {
        &self.patients
    }

    /// Monitors matching the search term.
    pub fn visible(&self) -> Vec<&MonitoredPatient> {
        self.patients
            .iter()
            .filter(|p| matches(p, &self.search))
            .collect()
    }

    pub fn cards(&self) -> Vec<PatientCard> {
        self.visible().into_iter().map(PatientCard::from).collect()
    }

    /// Validate a form before it is sent. Demonstration data is read-only.
    pub fn prepare_save(&self, form: &PatientForm) -> Result<SaveRequest, SaveRejected> {
        if self.mode.is_demo() {
            return Err(SaveRejected::DemoMode);
        }
        form.to_request()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(SpeedMode::Live)
    }
}
