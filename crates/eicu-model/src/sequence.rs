//! Encoded per-encounter sequences.

use serde::{Deserialize, Serialize};

use crate::encounter::CodeKind;

/// Sparse co-occurrence prior attached to a sequence.
///
/// `indices` holds flattened `(row, column)` coordinates, two ints per value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorGuide {
    pub indices: Vec<i64>,
    pub values: Vec<f32>,
}

impl PriorGuide {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coordinates as `(row, column)` pairs.
    pub fn coordinates(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.indices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

/// One emitted record per kept encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedSequence {
    /// `patient_id:encounter_id`.
    pub key: String,
    pub label_expired: u8,
    pub label_readmission: u8,
    /// Distinct diagnosis codes in first-occurrence order.
    pub dx_ids: Vec<String>,
    /// Vocabulary ids parallel to `dx_ids`.
    pub dx_ints: Vec<u32>,
    pub proc_ids: Vec<String>,
    pub proc_ints: Vec<u32>,
    pub prior: Option<PriorGuide>,
}

impl EncodedSequence {
    pub fn codes(&self, kind: CodeKind) -> &[String] {
        match kind {
            CodeKind::Diagnosis => &self.dx_ids,
            CodeKind::Treatment => &self.proc_ids,
        }
    }
}
