//! Add/edit monitor form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{NewPatient, PatientRecord, PatientUpdate};

/// Why a save was refused before reaching the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveRejected {
    #[error("Cannot modify data in Demo Mode")]
    DemoMode,

    #[error("Please fill in all required fields.")]
    MissingFields(Vec<&'static str>),
}

/// Request to send to the registry API.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(NewPatient),
    Update { id: i64, fields: PatientUpdate },
}

/// Form contents, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientForm {
    /// Set when editing an existing monitor
    pub editing_id: Option<i64>,
    pub name: String,
    pub ward: String,
    pub bed: String,
    pub saline: String,
    pub total_volume: String,
    pub rate: String,
}

impl PatientForm {
    /// Empty form for a new monitor.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Form prefilled for editing `record`.
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            editing_id: Some(record.id),
            name: record.name.clone(),
            ward: record.ward.clone(),
            bed: record.bed.clone(),
            saline: record.saline.label().to_string(),
            total_volume: record.total_volume.to_string(),
            rate: record.rate.to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    fn new_patient(&self) -> NewPatient {
        NewPatient {
            name: Some(self.name.clone()),
            ward: Some(self.ward.clone()),
            bed: Some(self.bed.clone()),
            saline: Some(self.saline.clone()),
            total_volume: numeric(&self.total_volume),
            rate: numeric(&self.rate),
        }
    }

    /// Validate and turn the form into an API request.
    pub fn to_request(&self) -> Result<SaveRequest, SaveRejected> {
        let fields = self.new_patient();
        let missing = fields.missing_fields();
        if !missing.is_empty() {
            return Err(SaveRejected::MissingFields(missing));
        }

        Ok(match self.editing_id {
            Some(id) => SaveRequest::Update {
                id,
                fields: PatientUpdate {
                    name: fields.name,
                    ward: fields.ward,
                    bed: fields.bed,
                    saline: fields.saline,
                    total_volume: fields.total_volume,
                    rate: fields.rate,
                    current_volume: None,
                },
            },
            None => SaveRequest::Create(fields),
        })
    }
}

fn numeric(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| Value::String(raw.to_string()))
}
