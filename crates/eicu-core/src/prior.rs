//! Attaching sparse conditional-probability priors to sequences.
//!
//! The prior is a `(2·max_positions)²` matrix over per-sequence code
//! positions: rows/columns `0..max_positions` are diagnosis positions and
//! `max_positions..` are treatment positions. Only the two off-diagonal
//! blocks are filled.

use std::collections::HashSet;

use tracing::debug;

use eicu_model::{CodeKind, ConditionalPriors, EncodedSequence, PriorGuide};

use crate::error::{CoreError, Result};
use crate::progress::{NoProgress, Progress};

/// Builds the prior for one sequence.
///
/// Block A holds `P(treatment_j | diagnosis_i)` at `(i, max_positions + j)`;
/// block B, iterated treatment-major, holds `P(diagnosis_i | treatment_j)`
/// at `(max_positions + j, i)`.
pub fn prior_guide(
    sequence: &EncodedSequence,
    priors: &ConditionalPriors,
    max_positions: usize,
) -> Result<PriorGuide> {
    for kind in [CodeKind::Diagnosis, CodeKind::Treatment] {
        let count = sequence.codes(kind).len();
        if count > max_positions {
            return Err(CoreError::PositionOverflow {
                key: sequence.key.clone(),
                kind,
                count,
                max_positions,
            });
        }
    }

    let pairs = sequence.dx_ids.len() * sequence.proc_ids.len();
    let offset = max_positions as i64;
    let mut guide = PriorGuide {
        indices: Vec::with_capacity(4 * pairs),
        values: Vec::with_capacity(2 * pairs),
    };

    for (i, dx) in sequence.dx_ids.iter().enumerate() {
        for (j, proc) in sequence.proc_ids.iter().enumerate() {
            guide.indices.extend([i as i64, offset + j as i64]);
            guide
                .values
                .push(priors.treatment_given_diagnosis(dx, proc) as f32);
        }
    }
    for (i, proc) in sequence.proc_ids.iter().enumerate() {
        for (j, dx) in sequence.dx_ids.iter().enumerate() {
            guide.indices.extend([offset + i as i64, j as i64]);
            guide
                .values
                .push(priors.diagnosis_given_treatment(proc, dx) as f32);
        }
    }
    Ok(guide)
}

pub fn inject(
    sequences: &[EncodedSequence],
    priors: &ConditionalPriors,
    key_set: &HashSet<String>,
    max_positions: usize,
) -> Result<Vec<EncodedSequence>> {
    inject_with_progress(sequences, priors, key_set, max_positions, &mut NoProgress)
}

/// Keeps the sequences whose key is in `key_set` and attaches their priors.
///
/// Input sequences are left untouched; the result holds augmented copies in
/// input order.
pub fn inject_with_progress(
    sequences: &[EncodedSequence],
    priors: &ConditionalPriors,
    key_set: &HashSet<String>,
    max_positions: usize,
    progress: &mut dyn Progress,
) -> Result<Vec<EncodedSequence>> {
    let mut selected = Vec::new();
    if key_set.is_empty() {
        return Ok(selected);
    }
    progress.start("priors", sequences.len() as u64);
    for sequence in sequences {
        progress.advance(1);
        if !key_set.contains(&sequence.key) {
            continue;
        }
        let guide = prior_guide(sequence, priors, max_positions)?;
        let mut augmented = sequence.clone();
        augmented.prior = Some(guide);
        selected.push(augmented);
    }
    progress.finish();
    debug!(
        requested = key_set.len(),
        selected = selected.len(),
        "priors attached"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(key: &str, dx: &[&str], proc: &[&str]) -> EncodedSequence {
        EncodedSequence {
            key: key.to_string(),
            label_expired: 0,
            label_readmission: 1,
            dx_ids: dx.iter().map(|s| s.to_string()).collect(),
            dx_ints: (0..dx.len() as u32).collect(),
            proc_ids: proc.iter().map(|s| s.to_string()).collect(),
            proc_ints: (0..proc.len() as u32).collect(),
            prior: None,
        }
    }

    #[test]
    fn block_coordinates_follow_positions() {
        let mut priors = ConditionalPriors::default();
        priors.dp_cond.insert("d0", "t1", 0.5);
        priors.pd_cond.insert("t1", "d0", 0.25);
        let seq = sequence("k", &["d0", "d1"], &["t0", "t1", "t2"]);

        let guide = prior_guide(&seq, &priors, 50).unwrap();
        assert_eq!(guide.values.len(), 12);
        assert_eq!(guide.indices.len(), 24);

        let coords: Vec<(i64, i64)> = guide.coordinates().collect();
        assert_eq!(coords[0], (0, 50));
        assert_eq!(coords[1], (0, 51));
        assert_eq!(coords[5], (1, 52));
        assert_eq!(coords[6], (50, 0));
        assert_eq!(coords[9], (51, 1));
        assert_eq!(coords[11], (52, 1));

        assert_eq!(guide.values[1], 0.5);
        // (t1, d0) is the first entry of treatment row 1 in block B.
        assert_eq!(guide.values[8], 0.25);
        assert_eq!(guide.values.iter().filter(|v| **v != 0.0).count(), 2);
    }

    #[test]
    fn overflow_is_rejected() {
        let seq = sequence("k", &["a", "b", "c"], &["t"]);
        let err = prior_guide(&seq, &ConditionalPriors::default(), 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PositionOverflow {
                kind: CodeKind::Diagnosis,
                count: 3,
                ..
            }
        ));
    }

    #[test]
    fn empty_key_set_returns_nothing() {
        let sequences = vec![sequence("a", &["d"], &["t"]), sequence("b", &["d"], &["t"])];
        let out = inject(&sequences, &ConditionalPriors::default(), &HashSet::new(), 50).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn inject_filters_and_preserves_order() {
        let sequences = vec![
            sequence("a", &["d"], &["t"]),
            sequence("b", &["d"], &["t"]),
            sequence("c", &["d"], &["t"]),
        ];
        let keys: HashSet<String> = ["c", "a"].iter().map(|s| s.to_string()).collect();
        let out = inject(&sequences, &ConditionalPriors::default(), &keys, 50).unwrap();
        let selected: Vec<&str> = out.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(selected, vec!["a", "c"]);
        assert!(out.iter().all(|s| s.prior.is_some()));
        assert!(sequences.iter().all(|s| s.prior.is_none()));
    }
}
