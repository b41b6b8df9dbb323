//! Run manifest listing every artifact with its checksum.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::FORMAT_VERSION;
use crate::error::{OutputError, Result};
use crate::json::{read_json, write_json_pretty};
use crate::layout::OutputLayout;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Checksum of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| OutputError::file(path, e))?;
    Ok(sha256_hex(&bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Path relative to the output root.
    pub path: String,
    /// Records or entries in the artifact, when it has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub format_version: u32,
    pub tool_version: String,
    /// Options the run was invoked with.
    pub options: serde_json::Value,
    pub num_folds: usize,
    pub artifacts: Vec<ArtifactEntry>,
}

impl RunManifest {
    pub fn new(options: serde_json::Value, num_folds: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            options,
            num_folds,
            artifacts: Vec::new(),
        }
    }

    /// Hashes `path` and records it relative to the layout root.
    pub fn add_file(
        &mut self,
        layout: &OutputLayout,
        path: &Path,
        records: Option<usize>,
    ) -> Result<()> {
        let sha256 = file_sha256(path)?;
        self.artifacts.push(ArtifactEntry {
            path: layout.relative(path),
            records,
            sha256,
        });
        Ok(())
    }

    pub fn artifact(&self, path: &str) -> Option<&ArtifactEntry> {
        self.artifacts.iter().find(|entry| entry.path == path)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let manifest: RunManifest = read_json(path)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(OutputError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: manifest.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(manifest)
    }

    /// Returns the artifacts whose current checksum differs from the recorded one.
    pub fn verify(&self, layout: &OutputLayout) -> Result<Vec<String>> {
        let mut changed = Vec::new();
        for entry in &self.artifacts {
            let actual = file_sha256(&layout.root().join(&entry.path))?;
            if actual != entry.sha256 {
                changed.push(entry.path.clone());
            }
        }
        Ok(changed)
    }
}
