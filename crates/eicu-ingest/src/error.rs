//! Error types for eICU data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during data ingestion operations.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required column missing from a table.
    #[error("required column '{column}' not found in {table}")]
    MissingColumn { column: String, table: String },

    /// Cell could not be parsed into the expected type.
    #[error("invalid {column} value '{value}' in {table} row {row}")]
    InvalidValue {
        column: String,
        value: String,
        table: String,
        row: usize,
    },

    // === Store Errors ===
    /// The same unit stay was inserted twice.
    #[error("duplicate encounter id: {encounter_id}")]
    DuplicateEncounter { encounter_id: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
