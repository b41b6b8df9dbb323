//! Output directory layout.
//!
//! ```text
//! <root>/dx_vocab.json
//! <root>/proc_vocab.json
//! <root>/manifest.json
//! <root>/fold_<k>/train_stats/*.json
//! <root>/fold_<k>/{train,validation,test}.jsonl
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use eicu_model::CodeKind;

use crate::error::{OutputError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const STATS_DIR: &str = "train_stats";

/// One of the three record sets of a fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SplitName {
    Train,
    Validation,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Validation, SplitName::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Validation => "validation",
            SplitName::Test => "test",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.jsonl", self.as_str())
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vocabulary(&self, kind: CodeKind) -> PathBuf {
        match kind {
            CodeKind::Diagnosis => self.root.join("dx_vocab.json"),
            CodeKind::Treatment => self.root.join("proc_vocab.json"),
        }
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn fold_dir(&self, fold: usize) -> PathBuf {
        self.root.join(format!("fold_{fold}"))
    }

    pub fn stats_dir(&self, fold: usize) -> PathBuf {
        self.fold_dir(fold).join(STATS_DIR)
    }

    pub fn split_file(&self, fold: usize, split: SplitName) -> PathBuf {
        self.fold_dir(fold).join(split.file_name())
    }

    /// Creates the root directory.
    pub fn create_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| OutputError::file(&self.root, e))
    }

    /// Creates the fold and stats directories.
    pub fn create_fold(&self, fold: usize) -> Result<PathBuf> {
        let dir = self.stats_dir(fold);
        fs::create_dir_all(&dir).map_err(|e| OutputError::file(&dir, e))?;
        Ok(dir)
    }

    /// Path of `path` relative to the root, with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
