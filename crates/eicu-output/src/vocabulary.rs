//! Vocabulary artifacts.
//!
//! A code's id is its index in `codes`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use eicu_model::{CodeKind, Vocabulary};

use crate::FORMAT_VERSION;
use crate::error::{OutputError, Result};
use crate::json::{read_json, write_json};

#[derive(Debug, Serialize, Deserialize)]
struct VocabularyDoc {
    format_version: u32,
    kind: CodeKind,
    codes: Vec<String>,
}

pub fn write_vocabulary(path: &Path, vocab: &Vocabulary) -> Result<()> {
    let doc = VocabularyDoc {
        format_version: FORMAT_VERSION,
        kind: vocab.kind(),
        codes: vocab.codes().to_vec(),
    };
    write_json(path, &doc)
}

/// Reads a vocabulary, checking its version, kind and that every code
/// appears once.
pub fn read_vocabulary(path: &Path, kind: CodeKind) -> Result<Vocabulary> {
    let doc: VocabularyDoc = read_json(path)?;
    if doc.format_version != FORMAT_VERSION {
        return Err(OutputError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: doc.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if doc.kind != kind {
        return Err(OutputError::kind_mismatch(path, kind, doc.kind));
    }
    let mut seen = HashSet::with_capacity(doc.codes.len());
    if let Some(code) = doc.codes.iter().find(|code| !seen.insert(code.as_str())) {
        return Err(OutputError::ContentMismatch {
            path: path.to_path_buf(),
            expected: "distinct codes".to_string(),
            found: format!("duplicate code {code:?}"),
        });
    }
    Ok(Vocabulary::from_codes(doc.kind, doc.codes))
}
