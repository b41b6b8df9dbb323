//! Source file locations and column names of the eICU tables.

use std::path::{Path, PathBuf};

use eicu_model::CodeKind;

use crate::error::{IngestError, Result};

pub const PATIENT_FILE: &str = "patient.csv";
pub const ADMISSION_DX_FILE: &str = "admissionDx.csv";
pub const DIAGNOSIS_FILE: &str = "diagnosis.csv";
pub const TREATMENT_FILE: &str = "treatment.csv";

/// Column names of `patient.csv`.
pub mod patient_columns {
    pub const PATIENT_ID: &str = "patienthealthsystemstayid";
    pub const ENCOUNTER_ID: &str = "patientunitstayid";
    /// Minutes from hospital admission to unit admission.
    pub const HOSPITAL_ADMIT_OFFSET: &str = "hospitaladmitoffset";
    pub const DISCHARGE_STATUS: &str = "unitdischargestatus";
    pub const DISCHARGE_OFFSET: &str = "unitdischargeoffset";
}

/// Encounter id column shared by every code table.
pub const ENCOUNTER_ID_COLUMN: &str = patient_columns::ENCOUNTER_ID;

/// A code table and the column holding its code values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSource {
    pub path: PathBuf,
    pub field: &'static str,
    pub target: CodeKind,
}

/// The four input tables of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub patient: PathBuf,
    pub admission_dx: PathBuf,
    pub diagnosis: PathBuf,
    pub treatment: PathBuf,
}

impl SourceFiles {
    /// Locates the input tables in `dir`, failing on the first missing file.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        let files = Self {
            patient: dir.join(PATIENT_FILE),
            admission_dx: dir.join(ADMISSION_DX_FILE),
            diagnosis: dir.join(DIAGNOSIS_FILE),
            treatment: dir.join(TREATMENT_FILE),
        };
        for path in [
            &files.patient,
            &files.admission_dx,
            &files.diagnosis,
            &files.treatment,
        ] {
            if !path.is_file() {
                return Err(IngestError::FileNotFound { path: path.clone() });
            }
        }
        Ok(files)
    }

    /// Code tables in merge order. Both diagnosis sources feed one list.
    pub fn code_sources(&self) -> Vec<CodeSource> {
        vec![
            CodeSource {
                path: self.admission_dx.clone(),
                field: "admitdxpath",
                target: CodeKind::Diagnosis,
            },
            CodeSource {
                path: self.diagnosis.clone(),
                field: "diagnosisstring",
                target: CodeKind::Diagnosis,
            },
            CodeSource {
                path: self.treatment.clone(),
                field: "treatmentstring",
                target: CodeKind::Treatment,
            },
        ]
    }
}
