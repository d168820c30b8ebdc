//! Drip depletion simulation.
//!
//! Advances each patient's ephemeral volume from its flow rate. The canonical
//! record is never touched: state built here is discarded on the next fetch.
//!
//! Per patient the state machine is `Active -> Active | Depleted`, with
//! `Depleted` terminal until a fresh record replaces the state.

mod ticker;

pub use ticker::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    drip_level, parse_int, time_remaining_minutes, PatientRecord, DEFAULT_RATE_ML_PER_HOUR,
    DEFAULT_TOTAL_VOLUME_ML,
};

/// Levels strictly below this percentage are flagged for the ward.
pub const LOW_LEVEL_THRESHOLD_PERCENT: f64 = 20.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Clock speed of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    /// Real time
    Live,
    /// Fast-forwarded sample data for showcasing the dashboard
    Demonstration,
}

impl SpeedMode {
    pub fn multiplier(self) -> f64 {
        match self {
            SpeedMode::Live => 1.0,
            SpeedMode::Demonstration => 100.0,
        }
    }

    pub fn is_demo(self) -> bool {
        matches!(self, SpeedMode::Demonstration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DripPhase {
    Active,
    Depleted,
}

/// Simulated runtime state of one infusion. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripState {
    pub patient_id: i64,
    /// ml/hour, always positive
    pub rate: f64,
    /// ml, always positive
    pub total_volume: f64,
    /// ml, within `[0, total_volume]`
    pub current_volume: f64,
    /// Percent, within `[0, 100]`
    pub drip_level: f64,
    /// Minutes
    pub time_remaining: f64,
}

impl DripState {
    /// Build a state, substituting defaults for unusable parameters.
    ///
    /// A missing or non-finite `current_volume` means a full bag.
    pub fn new(patient_id: i64, rate: f64, total_volume: f64, current_volume: Option<f64>) -> Self {
        let rate = positive_or(rate, DEFAULT_RATE_ML_PER_HOUR);
        let total_volume = positive_or(total_volume, DEFAULT_TOTAL_VOLUME_ML);
        let current_volume = current_volume
            .filter(|v| v.is_finite())
            .unwrap_or(total_volume)
            .clamp(0.0, total_volume);

        Self::derive(patient_id, rate, total_volume, current_volume)
    }

    pub fn from_record(record: &PatientRecord) -> Self {
        Self::new(
            record.id,
            record.rate as f64,
            record.total_volume as f64,
            Some(record.current_volume as f64),
        )
    }

    /// Build a state from an untyped record. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let number = |key: &str| value.get(key).and_then(lenient_f64);
        Self::new(
            value.get("id").and_then(parse_int).unwrap_or_default(),
            number("rate").unwrap_or(f64::NAN),
            number("totalVolume").unwrap_or(f64::NAN),
            number("currentVolume"),
        )
    }

    fn derive(patient_id: i64, rate: f64, total_volume: f64, current_volume: f64) -> Self {
        Self {
            patient_id,
            rate,
            total_volume,
            current_volume,
            drip_level: drip_level(current_volume, total_volume),
            time_remaining: time_remaining_minutes(current_volume, rate),
        }
    }

    pub fn phase(&self) -> DripPhase {
        if self.current_volume > 0.0 {
            DripPhase::Active
        } else {
            DripPhase::Depleted
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.phase() == DripPhase::Depleted
    }

    /// Active but below [`LOW_LEVEL_THRESHOLD_PERCENT`].
    pub fn is_low(&self) -> bool {
        !self.is_depleted() && self.drip_level < LOW_LEVEL_THRESHOLD_PERCENT
    }

    /// Volume drained per wall-clock second at 1x speed.
    pub fn depletion_per_second(&self) -> f64 {
        self.rate / SECONDS_PER_HOUR
    }

    /// State after `elapsed_seconds` of wall clock at `multiplier` speed.
    pub fn advanced(&self, elapsed_seconds: f64, multiplier: f64) -> Self {
        if self.is_depleted() {
            return self.clone();
        }

        let simulated_seconds = non_negative(elapsed_seconds) * non_negative(multiplier);
        let drained = self.depletion_per_second() * simulated_seconds;
        let current_volume = (self.current_volume - drained).max(0.0);

        Self::derive(self.patient_id, self.rate, self.total_volume, current_volume)
    }
}

/// Advance every patient by `elapsed_seconds` at `multiplier` speed.
pub fn advance(states: &[DripState], elapsed_seconds: f64, multiplier: f64) -> Vec<DripState> {
    states
        .iter()
        .map(|state| state.advanced(elapsed_seconds, multiplier))
        .collect()
}

/// One 1-second tick at the speed of `mode`.
pub fn tick(states: &[DripState], mode: SpeedMode) -> Vec<DripState> {
    advance(states, TICK_INTERVAL.as_secs_f64(), mode.multiplier())
}

fn positive_or(value: f64, default: u32) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default as f64
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Saline;
    use serde_json::json;

    fn scenario_record() -> PatientRecord {
        PatientRecord::new(
            7,
            "A".into(),
            "ICU".into(),
            "1".into(),
            Saline::NormalSaline,
            600,
            120,
            0,
        )
    }

    #[test]
    fn test_sixty_demo_ticks_drain_two_hundred_ml() {
        let mut states = vec![DripState::from_record(&scenario_record())];
        for _ in 0..60 {
            states = tick(&states, SpeedMode::Demonstration);
        }

        let state = &states[0];
        assert!((state.current_volume - 400.0).abs() < 1e-6);
        assert!((state.drip_level - 66.666_666).abs() < 1e-3);
        assert!((state.time_remaining - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_live_tick_drains_rate_over_3600() {
        let state = DripState::new(1, 3600.0, 1000.0, None);
        let next = tick(&[state], SpeedMode::Live);
        assert!((next[0].current_volume - 999.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_to_exactly_zero_and_stays() {
        let state = DripState::new(1, 3600.0, 100.0, Some(0.5));
        let drained = state.advanced(1.0, 1.0);
        assert_eq!(drained.current_volume, 0.0);
        assert_eq!(drained.drip_level, 0.0);
        assert_eq!(drained.time_remaining, 0.0);
        assert_eq!(drained.phase(), DripPhase::Depleted);

        assert_eq!(drained.advanced(10.0, 100.0), drained);
    }

    #[test]
    fn test_defaults_for_missing_parameters() {
        let state = DripState::new(1, 0.0, f64::NAN, None);
        assert_eq!(state.rate, 50.0);
        assert_eq!(state.total_volume, 500.0);
        assert_eq!(state.current_volume, 500.0);
        assert_eq!(state.drip_level, 100.0);
    }

    #[test]
    fn test_from_value_degrades_instead_of_failing() {
        let state = DripState::from_value(&json!({
            "id": 3,
            "name": "Jane",
            "rate": "fast",
            "totalVolume": null,
        }));
        assert_eq!(state.patient_id, 3);
        assert_eq!(state.rate, 50.0);
        assert_eq!(state.total_volume, 500.0);
        assert_eq!(state.current_volume, 500.0);

        let garbage = DripState::from_value(&json!("not a record"));
        assert_eq!(garbage.patient_id, 0);
        assert_eq!(garbage.total_volume, 500.0);
    }

    #[test]
    fn test_current_volume_clamped_on_construction() {
        let state = DripState::new(1, 50.0, 200.0, Some(900.0));
        assert_eq!(state.current_volume, 200.0);
        let state = DripState::new(1, 50.0, 200.0, Some(-4.0));
        assert!(state.is_depleted());
    }

    #[test]
    fn test_low_level_warning() {
        assert!(DripState::new(1, 50.0, 100.0, Some(19.0)).is_low());
        assert!(!DripState::new(1, 50.0, 100.0, Some(20.0)).is_low());
        assert!(!DripState::new(1, 50.0, 100.0, Some(0.0)).is_low());
    }

    #[test]
    fn test_negative_elapsed_is_no_op() {
        let state = DripState::new(1, 50.0, 100.0, None);
        assert_eq!(state.advanced(-5.0, 1.0), state);
    }

    #[test]
    fn test_speed_mode_multiplier() {
        assert_eq!(SpeedMode::Live.multiplier(), 1.0);
        assert_eq!(SpeedMode::Demonstration.multiplier(), 100.0);
    }
}
