//! Artifact output for eICU sequence preparation.
//!
//! Every JSON document carries `format_version`; readers reject other
//! versions.

pub mod error;
mod json;
pub mod layout;
pub mod manifest;
pub mod records;
pub mod tables;
pub mod vocabulary;

pub const FORMAT_VERSION: u32 = 1;

pub use error::{OutputError, Result};
pub use layout::{OutputLayout, SplitName};
pub use manifest::{ArtifactEntry, RunManifest, file_sha256, sha256_hex};
pub use records::{JsonLinesWriter, RecordSink, SequenceRecord, read_records, write_records};
pub use tables::{TABLE_NAMES, read_conditionals, read_prior_tables, table_path, write_prior_tables};
pub use vocabulary::{read_vocabulary, write_vocabulary};
