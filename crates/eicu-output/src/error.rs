//! Error types for artifact output.

use std::path::PathBuf;
use thiserror::Error;

use eicu_model::CodeKind;

/// Errors that can occur when writing or reading artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O failure on a stream without a known path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure on a file.
    #[error("failed to access {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record or document could not be parsed.
    #[error("failed to parse {path} line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Artifact written by an incompatible version.
    #[error("unsupported format version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Artifact holds a different table or vocabulary than requested.
    #[error("{path} holds {found}, expected {expected}")]
    ContentMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Record prior fields are inconsistent.
    #[error("record {key}: {reason}")]
    InvalidRecord { key: String, reason: String },
}

impl OutputError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn kind_mismatch(path: impl Into<PathBuf>, expected: CodeKind, found: CodeKind) -> Self {
        Self::ContentMismatch {
            path: path.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
