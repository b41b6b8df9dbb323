//! Builds an [`EncounterStore`] from the source tables on disk.

use std::time::Instant;

use tracing::{info, info_span};

use eicu_model::{CodeKind, IngestOptions};

use crate::csv_table::read_csv_table;
use crate::error::Result;
use crate::sources::SourceFiles;
use crate::store::{AdmissionStats, EncounterStore, MergeStats};

/// Merge outcome of one code table.
#[derive(Debug, Clone)]
pub struct CodeTableReport {
    pub table: String,
    pub target: CodeKind,
    pub rows: usize,
    pub stats: MergeStats,
}

/// Summary of a full load.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub admissions: AdmissionStats,
    pub code_tables: Vec<CodeTableReport>,
}

impl IngestReport {
    pub fn dropped_rows(&self) -> usize {
        self.code_tables.iter().map(|t| t.stats.dropped).sum()
    }
}

/// Reads the patient table, then merges every code table in order.
///
/// A duplicate encounter id aborts before any code table is read.
pub fn load_encounters(
    files: &SourceFiles,
    options: &IngestOptions,
) -> Result<(EncounterStore, IngestReport)> {
    let mut store = EncounterStore::new();
    let mut report = IngestReport::default();

    let start = Instant::now();
    let patients = read_csv_table(&files.patient)?;
    report.admissions = info_span!("admissions", table = %patients.name)
        .in_scope(|| store.ingest_admissions(&patients, options.duration_threshold_minutes))?;
    drop(patients);

    for source in files.code_sources() {
        let table = read_csv_table(&source.path)?;
        let stats = info_span!("codes", table = %table.name)
            .in_scope(|| store.merge_codes(&table, source.field, source.target))?;
        report.code_tables.push(CodeTableReport {
            table: table.name.clone(),
            target: source.target,
            rows: table.len(),
            stats,
        });
    }

    info!(
        encounters = store.len(),
        dropped_rows = report.dropped_rows(),
        duration_ms = start.elapsed().as_millis(),
        "encounter store loaded"
    );
    Ok((store, report))
}
