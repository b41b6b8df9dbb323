use thiserror::Error;

use eicu_model::{CodeKind, ModelError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A sequence has more code positions than the prior matrix block allows.
    #[error("sequence {key} has {count} {kind} codes, prior blocks hold at most {max_positions}")]
    PositionOverflow {
        key: String,
        kind: CodeKind,
        count: usize,
        max_positions: usize,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
