//! Core transformations from an encounter store to fold-ready sequences.
//!
//! - [`sequence`]: code filtering, deduplication and vocabulary ids
//! - [`split`]: repeated train/validation/test partitions
//! - [`stats`]: empirical priors from one fold's training split
//! - [`prior`]: split filtering and sparse prior attachment

pub mod error;
pub mod prior;
pub mod progress;
pub mod sequence;
pub mod split;
pub mod stats;

pub use error::{CoreError, Result};
pub use prior::{inject, inject_with_progress, prior_guide};
pub use progress::{NoProgress, Progress, RecordingProgress};
pub use sequence::{BuildSummary, DropReason, SequenceBuilder, SequenceSet};
pub use split::{Fold, SplitKeys, shuffle_split, split, split_folds};
pub use stats::{compute as compute_prior_tables, conditionals};
