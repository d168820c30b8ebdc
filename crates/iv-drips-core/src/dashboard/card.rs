//! Per-patient display strings.

use serde::{Deserialize, Serialize};

use super::MonitoredPatient;

/// Traffic-light status of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DripStatus {
    Normal,
    /// Below the low-level threshold
    Low,
    /// Bag empty
    Completed,
}

/// What a monitor tile shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCard {
    pub id: i64,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: String,
    pub rate_line: String,
    pub volume_line: String,
    pub time_remaining: String,
    /// Rounded for display
    pub level_percent: u8,
    pub status: DripStatus,
}

impl From<&MonitoredPatient> for PatientCard {
    fn from(patient: &MonitoredPatient) -> Self {
        let drip = &patient.drip;
        let status = if drip.is_depleted() {
            DripStatus::Completed
        } else if drip.is_low() {
            DripStatus::Low
        } else {
            DripStatus::Normal
        };

        Self {
            id: patient.id,
            name: patient.name.clone(),
            ward: patient.ward.clone(),
            bed: patient.bed.clone(),
            saline: patient.saline.clone(),
            rate_line: format!("{} ml/hr", drip.rate),
            volume_line: format!(
                "{} / {} ml",
                drip.current_volume.floor(),
                drip.total_volume
            ),
            time_remaining: format_time_remaining(drip.time_remaining),
            level_percent: drip.drip_level.round().clamp(0.0, 100.0) as u8,
            status,
        }
    }
}

/// Human readable time until empty, e.g. `2 hr 5 min`.
pub fn format_time_remaining(minutes: f64) -> String {
    if minutes.is_nan() || minutes <= 0.0 {
        return "Completed".to_string();
    }
    if minutes < 1.0 {
        return "< 1 min".to_string();
    }

    let hours = (minutes / 60.0).floor();
    let mins = (minutes % 60.0).floor();
    if hours > 0.0 {
        format!("{} hr {} min", hours, mins)
    } else {
        format!("{} min", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::DripState;

    fn patient(current: f64) -> MonitoredPatient {
        MonitoredPatient {
            id: 1,
            name: "John Doe".into(),
            ward: "ICU".into(),
            bed: "B-01".into(),
            saline: "Normal Saline".into(),
            drip: DripState::new(1, 120.0, 600.0, Some(current)),
        }
    }

    #[test]
    fn test_format_time_remaining() {
        assert_eq!(format_time_remaining(0.0), "Completed");
        assert_eq!(format_time_remaining(-1.0), "Completed");
        assert_eq!(format_time_remaining(f64::NAN), "Completed");
        assert_eq!(format_time_remaining(0.4), "< 1 min");
        assert_eq!(format_time_remaining(45.9), "45 min");
        assert_eq!(format_time_remaining(125.0), "2 hr 5 min");
        assert_eq!(format_time_remaining(60.0), "1 hr 0 min");
    }

    #[test]
    fn test_card_lines() {
        let card = PatientCard::from(&patient(400.7));
        assert_eq!(card.rate_line, "120 ml/hr");
        assert_eq!(card.volume_line, "400 / 600 ml");
        assert_eq!(card.time_remaining, "3 hr 20 min");
        assert_eq!(card.level_percent, 67);
        assert_eq!(card.status, DripStatus::Normal);
    }

    #[test]
    fn test_card_status() {
        assert_eq!(PatientCard::from(&patient(60.0)).status, DripStatus::Low);
        let empty = PatientCard::from(&patient(0.0));
        assert_eq!(empty.status, DripStatus::Completed);
        assert_eq!(empty.time_remaining, "Completed");
        assert_eq!(empty.level_percent, 0);
    }
}
