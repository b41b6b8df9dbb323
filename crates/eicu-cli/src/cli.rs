//! CLI argument definitions for `eicu-prep`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use eicu_model::{
    BuildOptions, DEFAULT_DURATION_THRESHOLD_MINUTES, DEFAULT_HOLDOUT_FRACTION,
    DEFAULT_MAX_NUM_CODES, DEFAULT_MIN_NUM_CODES, DEFAULT_NUM_FOLDS, Denominator, IngestOptions,
    PipelineOptions, PriorOptions, SplitOptions,
};

#[derive(Parser)]
#[command(
    name = "eicu-prep",
    version,
    about = "Prepare eICU encounters as coded sequences with co-occurrence priors",
    long_about = "Read the eICU patient, admissionDx, diagnosis and treatment tables,\n\
                  encode each unit stay as diagnosis and treatment code sequences,\n\
                  and write repeated train/validation/test folds with priors\n\
                  estimated from each fold's training split."
)]
pub struct Cli {
    /// Directory holding patient.csv, admissionDx.csv, diagnosis.csv and treatment.csv.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Directory to write vocabularies, fold statistics and record sets into.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Number of independent train/validation/test partitions.
    #[arg(long = "num-folds", default_value_t = DEFAULT_NUM_FOLDS)]
    pub num_folds: usize,

    /// Exclude stays whose unit discharge offset exceeds this many minutes.
    #[arg(
        long = "duration-threshold",
        value_name = "MINUTES",
        default_value_t = DEFAULT_DURATION_THRESHOLD_MINUTES
    )]
    pub duration_threshold: f64,

    /// Drop encounters with more distinct diagnoses or treatments than this.
    #[arg(long = "max-num-codes", default_value_t = DEFAULT_MAX_NUM_CODES)]
    pub max_num_codes: usize,

    /// Drop encounters with fewer distinct diagnoses or treatments than this.
    #[arg(long = "min-num-codes", default_value_t = DEFAULT_MIN_NUM_CODES)]
    pub min_num_codes: usize,

    /// Share of encounters held out for validation and test.
    #[arg(long = "holdout-fraction", default_value_t = DEFAULT_HOLDOUT_FRACTION)]
    pub holdout_fraction: f64,

    /// Drop encounters whose code lists contain repeats instead of deduplicating them.
    #[arg(long = "skip-duplicates")]
    pub skip_duplicates: bool,

    /// Divide counts by the training split size instead of all kept encounters.
    #[arg(long = "train-denominator")]
    pub train_denominator: bool,

    /// Do not draw progress bars.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow encounter identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

impl Cli {
    /// Maps the run flags onto pipeline options.
    ///
    /// The prior matrix offset follows the code cap so every position fits.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            ingest: IngestOptions {
                duration_threshold_minutes: self.duration_threshold,
            },
            build: BuildOptions {
                skip_duplicates: self.skip_duplicates,
                min_unique_codes: self.min_num_codes,
                max_unique_codes: self.max_num_codes,
            },
            split: SplitOptions {
                num_folds: self.num_folds,
                holdout_fraction: self.holdout_fraction,
            },
            prior: PriorOptions {
                max_positions: self.max_num_codes,
                denominator: if self.train_denominator {
                    Denominator::TrainingSubset
                } else {
                    Denominator::Population
                },
            },
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
