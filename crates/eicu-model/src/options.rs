//! Configuration options for the preparation pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Default stay-duration cutoff (24 hours).
pub const DEFAULT_DURATION_THRESHOLD_MINUTES: f64 = 1440.0;
pub const DEFAULT_MIN_NUM_CODES: usize = 1;
pub const DEFAULT_MAX_NUM_CODES: usize = 50;
pub const DEFAULT_NUM_FOLDS: usize = 5;
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.2;

/// Options for building the encounter store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Stays longer than this (unit discharge offset, minutes) are excluded.
    pub duration_threshold_minutes: f64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            duration_threshold_minutes: DEFAULT_DURATION_THRESHOLD_MINUTES,
        }
    }
}

impl IngestOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.duration_threshold_minutes.is_finite() || self.duration_threshold_minutes < 0.0 {
            return Err(ModelError::InvalidOption {
                name: "duration_threshold_minutes",
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.duration_threshold_minutes
                ),
            });
        }
        Ok(())
    }
}

/// Options for encoding encounters into sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Drop encounters whose code lists repeat a value.
    pub skip_duplicates: bool,
    pub min_unique_codes: usize,
    pub max_unique_codes: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: false,
            min_unique_codes: DEFAULT_MIN_NUM_CODES,
            max_unique_codes: DEFAULT_MAX_NUM_CODES,
        }
    }
}

impl BuildOptions {
    pub fn validate(&self) -> Result<()> {
        if self.min_unique_codes > self.max_unique_codes {
            return Err(ModelError::InvalidOption {
                name: "min_unique_codes",
                reason: format!(
                    "{} exceeds max_unique_codes {}",
                    self.min_unique_codes, self.max_unique_codes
                ),
            });
        }
        Ok(())
    }
}

/// Options for the repeated train/validation/test split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub num_folds: usize,
    /// Share of keys held out of training (then halved into validation/test).
    pub holdout_fraction: f64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            num_folds: DEFAULT_NUM_FOLDS,
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
        }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> Result<()> {
        if self.num_folds == 0 {
            return Err(ModelError::InvalidOption {
                name: "num_folds",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(ModelError::InvalidOption {
                name: "holdout_fraction",
                reason: format!("must be in (0, 1), got {}", self.holdout_fraction),
            });
        }
        Ok(())
    }
}

/// Divisor for marginal and joint probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Every encoded sequence, including those outside the training split.
    ///
    /// Understates probabilities when training is a strict subset; kept as the
    /// default so priors match previously generated datasets.
    #[default]
    Population,
    /// Only the training sequences.
    TrainingSubset,
}

/// Options for prior statistics and injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorOptions {
    /// Block offset of the treatment positions in the prior matrix.
    pub max_positions: usize,
    pub denominator: Denominator,
}

impl Default for PriorOptions {
    fn default() -> Self {
        Self {
            max_positions: DEFAULT_MAX_NUM_CODES,
            denominator: Denominator::default(),
        }
    }
}

impl PriorOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_positions == 0 {
            return Err(ModelError::InvalidOption {
                name: "max_positions",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// All pipeline options together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub ingest: IngestOptions,
    pub build: BuildOptions,
    pub split: SplitOptions,
    pub prior: PriorOptions,
}

impl PipelineOptions {
    /// Validates every section and cross-checks prior width against the code cap.
    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;
        self.build.validate()?;
        self.split.validate()?;
        self.prior.validate()?;
        if self.prior.max_positions < self.build.max_unique_codes {
            return Err(ModelError::InvalidOption {
                name: "max_positions",
                reason: format!(
                    "{} is smaller than max_unique_codes {}",
                    self.prior.max_positions, self.build.max_unique_codes
                ),
            });
        }
        Ok(())
    }
}
