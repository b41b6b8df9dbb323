//! Encounter store: admission ingestion, readmission labels and code merging.
//!
//! Admissions are read in two passes. The first pass orders every admission
//! row of a patient by `admit_offset` and labels all but the last stay as a
//! readmission; it sees rows that the duration cutoff later excludes, so a
//! long final stay still marks its predecessors. The second pass stores the
//! stays that pass the cutoff.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use eicu_model::{CodeKind, EXPIRED_STATUS, Encounter};

use crate::csv_table::{CsvTable, TableRow, trim_cell};
use crate::error::{IngestError, Result};
use crate::sources::{ENCOUNTER_ID_COLUMN, patient_columns};

/// Number of unknown encounter ids kept as examples in [`MergeStats`].
const UNKNOWN_EXAMPLE_LIMIT: usize = 5;

/// One parsed admission row.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRecord {
    pub patient_id: String,
    pub encounter_id: String,
    pub admit_offset: i64,
    pub discharge_status: String,
    /// Stay duration in minutes.
    pub discharge_offset: f64,
}

impl AdmissionRecord {
    /// Parses a `patient.csv` row.
    ///
    /// The source offset counts minutes from hospital admission to unit
    /// admission, so it is negated to make earlier stays more negative.
    pub fn from_row(row: &TableRow<'_>) -> Result<Self> {
        Ok(Self {
            patient_id: row.require(patient_columns::PATIENT_ID)?.to_string(),
            encounter_id: row.require(patient_columns::ENCOUNTER_ID)?.to_string(),
            admit_offset: row.parse_negated_i64(patient_columns::HOSPITAL_ADMIT_OFFSET)?,
            discharge_status: row.require(patient_columns::DISCHARGE_STATUS)?.to_string(),
            discharge_offset: row.parse_f64(patient_columns::DISCHARGE_OFFSET)?,
        })
    }
}

/// Counts reported by [`EncounterStore::ingest_admissions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdmissionStats {
    pub rows: usize,
    pub patients: usize,
    pub stored: usize,
    pub excluded_by_duration: usize,
}

/// Counts reported by [`EncounterStore::merge_codes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: usize,
    /// Rows whose encounter id is not in the store.
    pub dropped: usize,
    /// First few unknown encounter ids, for diagnostics.
    pub unknown_examples: Vec<String>,
}

/// Encounters keyed by id, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct EncounterStore {
    encounters: Vec<Encounter>,
    index: HashMap<String, usize>,
}

impl EncounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an encounter; a second insertion of the same id is an error.
    pub fn insert(&mut self, encounter: Encounter) -> Result<()> {
        if self.index.contains_key(&encounter.encounter_id) {
            return Err(IngestError::DuplicateEncounter {
                encounter_id: encounter.encounter_id,
            });
        }
        self.index
            .insert(encounter.encounter_id.clone(), self.encounters.len());
        self.encounters.push(encounter);
        Ok(())
    }

    pub fn get(&self, encounter_id: &str) -> Option<&Encounter> {
        self.index
            .get(encounter_id)
            .map(|&idx| &self.encounters[idx])
    }

    pub fn get_mut(&mut self, encounter_id: &str) -> Option<&mut Encounter> {
        match self.index.get(encounter_id) {
            Some(&idx) => self.encounters.get_mut(idx),
            None => None,
        }
    }

    pub fn contains(&self, encounter_id: &str) -> bool {
        self.index.contains_key(encounter_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Encounter> {
        self.encounters.iter()
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }

    /// Reads `patient.csv` rows and stores the stays within the duration cutoff.
    pub fn ingest_admissions(
        &mut self,
        table: &CsvTable,
        duration_threshold_minutes: f64,
    ) -> Result<AdmissionStats> {
        for column in [
            patient_columns::PATIENT_ID,
            patient_columns::ENCOUNTER_ID,
            patient_columns::HOSPITAL_ADMIT_OFFSET,
            patient_columns::DISCHARGE_STATUS,
            patient_columns::DISCHARGE_OFFSET,
        ] {
            table.require_column(column)?;
        }
        let records = table
            .records()
            .map(|row| AdmissionRecord::from_row(&row))
            .collect::<Result<Vec<_>>>()?;
        self.ingest_admission_records(&records, duration_threshold_minutes)
    }

    /// Labels and stores already-parsed admission rows.
    pub fn ingest_admission_records(
        &mut self,
        records: &[AdmissionRecord],
        duration_threshold_minutes: f64,
    ) -> Result<AdmissionStats> {
        let readmissions = readmission_labels(records);
        let patients = count_patients(records);
        let mut stats = AdmissionStats {
            rows: records.len(),
            patients,
            ..AdmissionStats::default()
        };

        for record in records {
            if record.discharge_offset > duration_threshold_minutes {
                stats.excluded_by_duration += 1;
                continue;
            }
            let readmission = readmissions
                .get(record.encounter_id.as_str())
                .copied()
                .unwrap_or(false);
            let encounter = Encounter::new(
                record.patient_id.clone(),
                record.encounter_id.clone(),
                record.admit_offset,
                record.discharge_status == EXPIRED_STATUS,
                readmission,
            );
            self.insert(encounter)?;
            stats.stored += 1;
        }

        info!(
            rows = stats.rows,
            patients = stats.patients,
            stored = stats.stored,
            excluded_by_duration = stats.excluded_by_duration,
            duration_threshold_minutes,
            "admissions ingested"
        );
        Ok(stats)
    }

    /// Appends the lower-cased `field` value of every row to the owning
    /// encounter's `target` code list.
    ///
    /// Rows that reference an unknown encounter are counted and skipped.
    pub fn merge_codes(
        &mut self,
        table: &CsvTable,
        field: &str,
        target: CodeKind,
    ) -> Result<MergeStats> {
        let id_idx = table.require_column(ENCOUNTER_ID_COLUMN)?;
        let code_idx = table.require_column(field)?;
        let mut stats = MergeStats::default();

        for row in &table.rows {
            let encounter_id = row.get(id_idx).map_or("", |id| trim_cell(id));
            // Codes are lowercased only; surrounding whitespace is significant.
            let code = row.get(code_idx).map_or("", String::as_str);
            match self.get_mut(encounter_id) {
                Some(encounter) => {
                    encounter.codes_mut(target).push(code.to_lowercase());
                    stats.merged += 1;
                }
                None => {
                    stats.dropped += 1;
                    if stats.unknown_examples.len() < UNKNOWN_EXAMPLE_LIMIT {
                        stats.unknown_examples.push(encounter_id.to_string());
                    }
                }
            }
        }

        if stats.dropped > 0 {
            warn!(
                table = %table.name,
                dropped = stats.dropped,
                "rows without a stored encounter were dropped"
            );
        }
        debug!(
            table = %table.name,
            field,
            target = %target,
            merged = stats.merged,
            "codes merged"
        );
        Ok(stats)
    }
}

/// Readmission flag per encounter id.
///
/// Each patient's stays are stable-sorted by `admit_offset`; every stay but
/// the last is a readmission.
pub fn readmission_labels(records: &[AdmissionRecord]) -> HashMap<&str, bool> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_patient: HashMap<&str, Vec<(i64, &str)>> = HashMap::new();
    for record in records {
        let stays = by_patient
            .entry(record.patient_id.as_str())
            .or_insert_with(|| {
                order.push(record.patient_id.as_str());
                Vec::new()
            });
        stays.push((record.admit_offset, record.encounter_id.as_str()));
    }

    let mut labels = HashMap::with_capacity(records.len());
    for patient_id in order {
        let Some(stays) = by_patient.get_mut(patient_id) else {
            continue;
        };
        stays.sort_by_key(|(offset, _)| *offset);
        let last = stays.len() - 1;
        for (position, (_, encounter_id)) in stays.iter().enumerate() {
            labels.insert(*encounter_id, position != last);
        }
    }
    labels
}

fn count_patients(records: &[AdmissionRecord]) -> usize {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.patient_id.as_str()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(patient: &str, encounter: &str, offset: i64, minutes: f64) -> AdmissionRecord {
        AdmissionRecord {
            patient_id: patient.to_string(),
            encounter_id: encounter.to_string(),
            admit_offset: offset,
            discharge_status: "Alive".to_string(),
            discharge_offset: minutes,
        }
    }

    #[test]
    fn earlier_stay_is_readmission() {
        let records = vec![
            record("P1", "E2", -100, 60.0),
            record("P1", "E1", -500, 60.0),
        ];
        let labels = readmission_labels(&records);
        assert_eq!(labels.get("E1"), Some(&true));
        assert_eq!(labels.get("E2"), Some(&false));
    }

    #[test]
    fn single_stay_is_not_readmission() {
        let records = vec![record("P9", "E9", 0, 60.0)];
        let labels = readmission_labels(&records);
        assert_eq!(labels.get("E9"), Some(&false));
    }

    #[test]
    fn ties_keep_table_order() {
        let records = vec![
            record("P1", "B", -10, 60.0),
            record("P1", "A", -10, 60.0),
        ];
        let labels = readmission_labels(&records);
        assert_eq!(labels.get("B"), Some(&true));
        assert_eq!(labels.get("A"), Some(&false));
    }

    #[test]
    fn excluded_last_stay_still_labels_predecessor() {
        let mut store = EncounterStore::new();
        let records = vec![
            record("P1", "E1", -500, 60.0),
            record("P1", "E2", -100, 5000.0),
        ];
        let stats = store.ingest_admission_records(&records, 1440.0).unwrap();
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.excluded_by_duration, 1);
        assert!(store.get("E1").unwrap().readmission);
        assert!(!store.contains("E2"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut store = EncounterStore::new();
        let records = vec![
            record("P1", "E1", 0, 1440.0),
            record("P2", "E2", 0, 1440.5),
        ];
        store.ingest_admission_records(&records, 1440.0).unwrap();
        assert!(store.contains("E1"));
        assert!(!store.contains("E2"));
    }
}
