//! Patient infusion records and the payloads that create and edit them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Saline;

/// Bag volume assumed when none (or a non-numeric one) is given.
pub const DEFAULT_TOTAL_VOLUME_ML: u32 = 500;
/// Flow rate assumed when none (or a non-numeric one) is given.
pub const DEFAULT_RATE_ML_PER_HOUR: u32 = 50;
/// Drip level of a freshly hung bag.
pub const FULL_DRIP_LEVEL: f64 = 100.0;

/// A canonical patient infusion record, as persisted by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Creation timestamp in epoch milliseconds; immutable
    pub id: i64,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: Saline,
    /// Bag size in ml
    pub total_volume: u32,
    /// Flow rate in ml/hour
    pub rate: u32,
    /// Last known volume in ml
    pub current_volume: u32,
    /// Percentage of the bag remaining (0-100)
    pub drip_level: f64,
    /// Epoch milliseconds, informational only
    pub start_time: i64,
}

impl PatientRecord {
    /// Create a full-bag record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        name: String,
        ward: String,
        bed: String,
        saline: Saline,
        total_volume: u32,
        rate: u32,
        start_time: i64,
    ) -> Self {
        Self {
            id,
            name,
            ward,
            bed,
            saline,
            total_volume,
            rate,
            current_volume: total_volume,
            drip_level: FULL_DRIP_LEVEL,
            start_time,
        }
    }

    /// Rebuild a stored record from untyped JSON, as older snapshots hold
    /// numbers written as strings. Unusable numbers take the create-time
    /// defaults; `None` only when there is no usable `id`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id").and_then(parse_int)?;
        let text = |key: &str| match value.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let positive = |key: &str, default: u32| {
            value
                .get(key)
                .and_then(parse_positive_int)
                .unwrap_or(default)
        };

        let total_volume = positive("totalVolume", DEFAULT_TOTAL_VOLUME_ML);
        let current_volume = value
            .get("currentVolume")
            .and_then(parse_int)
            .map_or(total_volume, |v| v.clamp(0, total_volume as i64) as u32);

        Some(Self {
            id,
            name: text("name"),
            ward: text("ward"),
            bed: text("bed"),
            saline: Saline::from_label(&text("saline")),
            total_volume,
            rate: positive("rate", DEFAULT_RATE_ML_PER_HOUR),
            current_volume,
            drip_level: drip_level(current_volume as f64, total_volume as f64),
            start_time: value.get("startTime").and_then(parse_int).unwrap_or(id),
        })
    }

    /// Minutes until the bag runs dry at the stored rate.
    pub fn time_remaining_minutes(&self) -> f64 {
        time_remaining_minutes(self.current_volume as f64, self.rate as f64)
    }
}

/// Percentage of `total` that `current` represents, clamped to `[0, 100]`.
pub fn drip_level(current: f64, total: f64) -> f64 {
    if total <= 0.0 || !current.is_finite() {
        return 0.0;
    }
    (current / total * 100.0).clamp(0.0, 100.0)
}

/// Minutes to drain `current` ml at `rate` ml/hour; zero once empty.
pub fn time_remaining_minutes(current: f64, rate: f64) -> f64 {
    if current > 0.0 && rate > 0.0 {
        current / rate * 60.0
    } else {
        0.0
    }
}

/// Create payload for a new monitor.
///
/// Every field is optional on the wire so that validation, not
/// deserialization, reports what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPatient {
    pub name: Option<String>,
    pub ward: Option<String>,
    pub bed: Option<String>,
    pub saline: Option<String>,
    pub total_volume: Option<Value>,
    pub rate: Option<Value>,
}

impl NewPatient {
    /// Names of required text fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("ward", &self.ward),
            ("bed", &self.bed),
            ("saline", &self.saline),
        ]
        .into_iter()
        .filter(|(_, value)| non_blank(value.as_deref()).is_none())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn total_volume_or_default(&self) -> u32 {
        self.total_volume
            .as_ref()
            .and_then(parse_positive_int)
            .unwrap_or(DEFAULT_TOTAL_VOLUME_ML)
    }

    pub fn rate_or_default(&self) -> u32 {
        self.rate
            .as_ref()
            .and_then(parse_positive_int)
            .unwrap_or(DEFAULT_RATE_ML_PER_HOUR)
    }
}

/// Partial edit of an existing record. `id` and unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub ward: Option<String>,
    pub bed: Option<String>,
    pub saline: Option<String>,
    pub total_volume: Option<Value>,
    pub rate: Option<Value>,
    pub current_volume: Option<Value>,
}

impl PatientUpdate {
    /// Merge this edit over `existing`, keeping stored values for anything
    /// absent, blank or non-numeric.
    pub fn merge_into(&self, existing: &PatientRecord) -> PatientRecord {
        let mut merged = existing.clone();

        if let Some(name) = non_blank(self.name.as_deref()) {
            merged.name = name.to_string();
        }
        if let Some(ward) = non_blank(self.ward.as_deref()) {
            merged.ward = ward.to_string();
        }
        if let Some(bed) = non_blank(self.bed.as_deref()) {
            merged.bed = bed.to_string();
        }
        if let Some(saline) = non_blank(self.saline.as_deref()) {
            merged.saline = Saline::from_label(saline);
        }
        if let Some(total) = self.total_volume.as_ref().and_then(parse_positive_int) {
            merged.total_volume = total;
        }
        if let Some(rate) = self.rate.as_ref().and_then(parse_positive_int) {
            merged.rate = rate;
        }
        if let Some(current) = self.current_volume.as_ref().and_then(parse_int) {
            merged.current_volume = current.clamp(0, u32::MAX as i64) as u32;
        }

        merged.current_volume = merged.current_volume.min(merged.total_volume);
        merged.drip_level = drip_level(merged.current_volume as f64, merged.total_volume as f64);
        merged
    }
}

/// A demonstration record, carrying its precomputed time remaining.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DemoPatient {
    #[serde(flatten)]
    pub record: PatientRecord,
    /// Minutes
    pub time_remaining: f64,
}

impl From<PatientRecord> for DemoPatient {
    fn from(record: PatientRecord) -> Self {
        let time_remaining = record.time_remaining_minutes();
        Self {
            record,
            time_remaining,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an integer the way a browser form submits one.
///
/// Numbers are truncated; strings use their leading integer prefix
/// (`"120ml"` is 120). Anything else is absent.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Like [`parse_int`], but zero and negatives count as absent.
pub fn parse_positive_int(value: &Value) -> Option<u32> {
    parse_int(value)
        .filter(|n| *n > 0)
        .map(|n| n.min(u32::MAX as i64) as u32)
}

fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> PatientRecord {
        PatientRecord::new(
            1,
            "A".into(),
            "ICU".into(),
            "1".into(),
            Saline::NormalSaline,
            600,
            120,
            1,
        )
    }

    #[test]
    fn test_new_record_is_full() {
        let r = record();
        assert_eq!(r.current_volume, 600);
        assert_eq!(r.drip_level, 100.0);
        assert_eq!(r.time_remaining_minutes(), 300.0);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["totalVolume"], 600);
        assert_eq!(value["currentVolume"], 600);
        assert_eq!(value["dripLevel"], 100.0);
        assert_eq!(value["saline"], "Normal Saline");
        assert!(value.get("startTime").is_some());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(&json!(120)), Some(120));
        assert_eq!(parse_int(&json!(99.9)), Some(99));
        assert_eq!(parse_int(&json!("250")), Some(250));
        assert_eq!(parse_int(&json!("  80ml")), Some(80));
        assert_eq!(parse_int(&json!("-5")), Some(-5));
        assert_eq!(parse_int(&json!("abc")), None);
        assert_eq!(parse_int(&json!(null)), None);
        assert_eq!(parse_int(&json!(true)), None);
    }

    #[test]
    fn test_parse_positive_int_rejects_zero_and_negative() {
        assert_eq!(parse_positive_int(&json!(0)), None);
        assert_eq!(parse_positive_int(&json!("-20")), None);
        assert_eq!(parse_positive_int(&json!("15")), Some(15));
    }

    #[test]
    fn test_missing_fields() {
        let payload = NewPatient {
            name: Some("A".into()),
            ward: None,
            bed: Some("  ".into()),
            saline: Some("Normal Saline".into()),
            ..Default::default()
        };
        assert_eq!(payload.missing_fields(), vec!["ward", "bed"]);
    }

    #[test]
    fn test_numeric_defaults() {
        let payload = NewPatient {
            total_volume: Some(json!("")),
            rate: Some(json!("fast")),
            ..Default::default()
        };
        assert_eq!(payload.total_volume_or_default(), DEFAULT_TOTAL_VOLUME_ML);
        assert_eq!(payload.rate_or_default(), DEFAULT_RATE_ML_PER_HOUR);
    }

    #[test]
    fn test_merge_keeps_existing_for_absent_fields() {
        let update = PatientUpdate {
            ward: Some("HDU".into()),
            rate: Some(json!("not a number")),
            name: Some("".into()),
            ..Default::default()
        };
        let merged = update.merge_into(&record());
        assert_eq!(merged.ward, "HDU");
        assert_eq!(merged.name, "A");
        assert_eq!(merged.rate, 120);
        assert_eq!(merged.id, 1);
    }

    #[test]
    fn test_merge_clamps_current_volume_to_new_total() {
        let update = PatientUpdate {
            total_volume: Some(json!(250)),
            ..Default::default()
        };
        let merged = update.merge_into(&record());
        assert_eq!(merged.total_volume, 250);
        assert_eq!(merged.current_volume, 250);
        assert_eq!(merged.drip_level, 100.0);
    }

    #[test]
    fn test_merge_current_volume_recomputes_level() {
        let update = PatientUpdate {
            current_volume: Some(json!(150)),
            ..Default::default()
        };
        let merged = update.merge_into(&record());
        assert_eq!(merged.current_volume, 150);
        assert_eq!(merged.drip_level, 25.0);
    }

    #[test]
    fn test_demo_patient_flattens() {
        let demo = DemoPatient::from(record());
        let value = serde_json::to_value(&demo).unwrap();
        assert_eq!(value["timeRemaining"], 300.0);
        assert_eq!(value["name"], "A");
    }

    #[test]
    fn test_from_value_accepts_string_numbers() {
        let record = PatientRecord::from_value(&json!({
            "id": 1_700_000_000_000i64,
            "name": "Jane Smith",
            "ward": "General",
            "bed": 12,
            "saline": "Ringer Lactate",
            "totalVolume": "1000",
            "rate": "60",
            "currentVolume": 750,
            "dripLevel": 75,
            "startTime": 1_700_000_000_000i64
        }))
        .unwrap();

        assert_eq!(record.total_volume, 1000);
        assert_eq!(record.rate, 60);
        assert_eq!(record.current_volume, 750);
        assert_eq!(record.drip_level, 75.0);
        assert_eq!(record.bed, "12");
        assert_eq!(record.saline, Saline::RingerLactate);
    }

    #[test]
    fn test_from_value_defaults_and_clamps() {
        let record = PatientRecord::from_value(&json!({
            "id": "42",
            "name": "A",
            "rate": "fast",
            "currentVolume": "9000"
        }))
        .unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.rate, DEFAULT_RATE_ML_PER_HOUR);
        assert_eq!(record.total_volume, DEFAULT_TOTAL_VOLUME_ML);
        assert_eq!(record.current_volume, DEFAULT_TOTAL_VOLUME_ML);
        assert_eq!(record.start_time, 42);

        assert!(PatientRecord::from_value(&json!({"name": "no id"})).is_none());
        assert!(PatientRecord::from_value(&json!("not a record")).is_none());
    }

    #[test]
    fn test_drip_level_bounds() {
        assert_eq!(drip_level(-3.0, 100.0), 0.0);
        assert_eq!(drip_level(150.0, 100.0), 100.0);
        assert_eq!(drip_level(10.0, 0.0), 0.0);
        assert_eq!(time_remaining_minutes(0.0, 50.0), 0.0);
    }
}
