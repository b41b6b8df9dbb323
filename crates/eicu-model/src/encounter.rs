//! Encounter entity and code kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discharge status value that marks an in-unit death.
pub const EXPIRED_STATUS: &str = "Expired";

/// Which code list a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    Diagnosis,
    Treatment,
}

impl CodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CodeKind::Diagnosis => "diagnosis",
            CodeKind::Treatment => "treatment",
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inpatient unit stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Groups the stays of one patient (health system stay).
    pub patient_id: String,
    /// Unit stay identifier, unique across the store.
    pub encounter_id: String,
    /// Chronological position within the patient; more negative is earlier.
    pub admit_offset: i64,
    pub expired: bool,
    /// True when the patient has a later encounter.
    pub readmission: bool,
    pub dx_codes: Vec<String>,
    pub treatment_codes: Vec<String>,
}

impl Encounter {
    pub fn new(
        patient_id: impl Into<String>,
        encounter_id: impl Into<String>,
        admit_offset: i64,
        expired: bool,
        readmission: bool,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            encounter_id: encounter_id.into(),
            admit_offset,
            expired,
            readmission,
            dx_codes: Vec::new(),
            treatment_codes: Vec::new(),
        }
    }

    /// Sequence key: `patient_id:encounter_id`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.patient_id, self.encounter_id)
    }

    pub fn codes(&self, kind: CodeKind) -> &[String] {
        match kind {
            CodeKind::Diagnosis => &self.dx_codes,
            CodeKind::Treatment => &self.treatment_codes,
        }
    }

    pub fn codes_mut(&mut self, kind: CodeKind) -> &mut Vec<String> {
        match kind {
            CodeKind::Diagnosis => &mut self.dx_codes,
            CodeKind::Treatment => &mut self.treatment_codes,
        }
    }
}

/// Distinct values in first-occurrence order.
pub fn distinct_codes(codes: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(codes.len());
    codes
        .iter()
        .filter(|code| seen.insert(code.as_str()))
        .cloned()
        .collect()
}

/// Returns true when any value appears more than once.
pub fn has_duplicates(codes: &[String]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(codes.len());
    codes.iter().any(|code| !seen.insert(code.as_str()))
}
