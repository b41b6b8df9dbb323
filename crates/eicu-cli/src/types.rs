use std::path::PathBuf;

use eicu_core::BuildSummary;
use eicu_ingest::IngestReport;

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
    pub ingest: IngestReport,
    pub build: BuildSummary,
    pub dx_vocab: usize,
    pub proc_vocab: usize,
    pub folds: Vec<FoldSummary>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSummary {
    pub index: usize,
    pub seed: u64,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
    /// Distinct diagnoses seen in the training split.
    pub dx_priors: usize,
    pub proc_priors: usize,
}
