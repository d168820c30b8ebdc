//! Infusion solution types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Solution hanging on the drip stand.
///
/// Serialized as its ward label. Labels outside the known set are kept
/// verbatim so older snapshots still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Saline {
    /// 0.9% NaCl
    NormalSaline,
    RingerLactate,
    Dextrose5,
    AntibioticSolution,
    PainManagement,
    Other(String),
}

impl Saline {
    /// The fixed set offered by the monitor form.
    pub fn known() -> [Saline; 5] {
        [
            Saline::NormalSaline,
            Saline::RingerLactate,
            Saline::Dextrose5,
            Saline::AntibioticSolution,
            Saline::PainManagement,
        ]
    }

    /// Parse a ward label. Matching is exact; anything else becomes `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Normal Saline" => Saline::NormalSaline,
            "Ringer Lactate" => Saline::RingerLactate,
            "Dextrose 5%" => Saline::Dextrose5,
            "Antibiotic Sol" => Saline::AntibioticSolution,
            "Pain Mgmt" => Saline::PainManagement,
            other => Saline::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Saline::NormalSaline => "Normal Saline",
            Saline::RingerLactate => "Ringer Lactate",
            Saline::Dextrose5 => "Dextrose 5%",
            Saline::AntibioticSolution => "Antibiotic Sol",
            Saline::PainManagement => "Pain Mgmt",
            Saline::Other(label) => label,
        }
    }

    /// Longer description shown in pickers.
    pub fn description(&self) -> &str {
        match self {
            Saline::NormalSaline => "Normal Saline (0.9% NaCl)",
            Saline::AntibioticSolution => "Antibiotic Solution",
            Saline::PainManagement => "Pain Management",
            other => other.label(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Saline::Other(_))
    }
}

impl fmt::Display for Saline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Saline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Saline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Saline::from_label(&label))
    }
}
