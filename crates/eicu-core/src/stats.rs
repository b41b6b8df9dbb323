//! Empirical marginal, joint and conditional code probabilities.
//!
//! Counts come from the training sequences of one fold. With
//! [`Denominator::Population`] they are divided by the size of the whole
//! sequence list, not the training subset; priors built this way are
//! smaller than true training frequencies by the training share.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use eicu_model::{ConditionalPriors, Denominator, EncodedSequence, PairTable, PriorTables};

#[derive(Debug, Default)]
struct Counts {
    dx: BTreeMap<String, usize>,
    proc: BTreeMap<String, usize>,
    pairs: BTreeMap<String, BTreeMap<String, usize>>,
    training: usize,
}

impl Counts {
    fn add(&mut self, sequence: &EncodedSequence) {
        for dx in &sequence.dx_ids {
            *self.dx.entry(dx.clone()).or_insert(0) += 1;
        }
        for proc in &sequence.proc_ids {
            *self.proc.entry(proc.clone()).or_insert(0) += 1;
        }
        for dx in &sequence.dx_ids {
            let row = self.pairs.entry(dx.clone()).or_default();
            for proc in &sequence.proc_ids {
                *row.entry(proc.clone()).or_insert(0) += 1;
            }
        }
        self.training += 1;
    }
}

fn probability(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count as f64 / denominator as f64
    }
}

/// Computes the five prior tables for one fold.
///
/// Every sequence is scanned; only those whose key is in `training_keys`
/// contribute counts. Conditionals cover the full cross product of observed
/// diagnoses and treatments, with `0.0` for pairs never seen together.
pub fn compute(
    sequences: &[EncodedSequence],
    training_keys: &HashSet<String>,
    denominator: Denominator,
) -> PriorTables {
    let mut counts = Counts::default();
    for sequence in sequences {
        if training_keys.contains(&sequence.key) {
            counts.add(sequence);
        }
    }

    let total = match denominator {
        Denominator::Population => sequences.len(),
        Denominator::TrainingSubset => counts.training,
    };
    if total == 0 {
        debug!("no sequences to count, prior tables are empty");
        return PriorTables::default();
    }

    let dx_probs: BTreeMap<String, f64> = counts
        .dx
        .into_iter()
        .map(|(code, count)| (code, probability(count, total)))
        .collect();
    let proc_probs: BTreeMap<String, f64> = counts
        .proc
        .into_iter()
        .map(|(code, count)| (code, probability(count, total)))
        .collect();
    let dp_probs: PairTable = counts
        .pairs
        .into_iter()
        .flat_map(|(dx, row)| {
            row.into_iter()
                .map(move |(proc, count)| (dx.clone(), proc, probability(count, total)))
        })
        .collect();

    let conditionals = conditionals(&dx_probs, &proc_probs, &dp_probs);

    info!(
        training = counts.training,
        denominator = total,
        dx_codes = dx_probs.len(),
        proc_codes = proc_probs.len(),
        joint_pairs = dp_probs.len(),
        conditional_pairs = conditionals.dp_cond.len(),
        "prior statistics computed"
    );

    PriorTables {
        dx_probs,
        proc_probs,
        dp_probs,
        conditionals,
        denominator: total,
        training_sequences: counts.training,
    }
}

/// `P(t|d) = P(d,t) / P(d)` and `P(d|t) = P(d,t) / P(t)` over every observed
/// `(d, t)` combination.
pub fn conditionals(
    dx_probs: &BTreeMap<String, f64>,
    proc_probs: &BTreeMap<String, f64>,
    dp_probs: &PairTable,
) -> ConditionalPriors {
    let mut priors = ConditionalPriors::default();
    for (dx, dx_prob) in dx_probs {
        for (proc, proc_prob) in proc_probs {
            let (dp, pd) = match dp_probs.get(dx, proc) {
                Some(joint) => (ratio(joint, *dx_prob), ratio(joint, *proc_prob)),
                None => (0.0, 0.0),
            };
            priors.dp_cond.insert(dx, proc, dp);
            priors.pd_cond.insert(proc, dx, pd);
        }
    }
    priors
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(key: &str, dx: &[&str], proc: &[&str]) -> EncodedSequence {
        EncodedSequence {
            key: key.to_string(),
            label_expired: 0,
            label_readmission: 0,
            dx_ids: dx.iter().map(|s| s.to_string()).collect(),
            dx_ints: (0..dx.len() as u32).collect(),
            proc_ids: proc.iter().map(|s| s.to_string()).collect(),
            proc_ints: (0..proc.len() as u32).collect(),
            prior: None,
        }
    }

    fn keys(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn population_denominator_counts_all_sequences() {
        let sequences = vec![
            sequence("a", &["d1"], &["t1"]),
            sequence("b", &["d1", "d2"], &["t2"]),
            sequence("c", &["d3"], &["t3"]),
            sequence("d", &["d3"], &["t3"]),
        ];
        let tables = compute(&sequences, &keys(&["a", "b"]), Denominator::Population);

        assert_eq!(tables.denominator, 4);
        assert_eq!(tables.training_sequences, 2);
        assert_eq!(tables.dx_probs.get("d1"), Some(&0.5));
        assert_eq!(tables.dx_probs.get("d2"), Some(&0.25));
        assert!(!tables.dx_probs.contains_key("d3"));
        assert_eq!(tables.dp_probs.get("d1", "t1"), Some(0.25));
        // P(t1 | d1) = 0.25 / 0.5
        assert_eq!(tables.dp_cond().get("d1", "t1"), Some(0.5));
        // P(d1 | t1) = 0.25 / 0.25
        assert_eq!(tables.pd_cond().get("t1", "d1"), Some(1.0));
    }

    #[test]
    fn training_subset_denominator() {
        let sequences = vec![
            sequence("a", &["d1"], &["t1"]),
            sequence("b", &["d2"], &["t1"]),
            sequence("c", &["d2"], &["t2"]),
        ];
        let tables = compute(&sequences, &keys(&["a", "b"]), Denominator::TrainingSubset);
        assert_eq!(tables.denominator, 2);
        assert_eq!(tables.proc_probs.get("t1"), Some(&1.0));
        assert_eq!(tables.dx_probs.get("d1"), Some(&0.5));
    }

    #[test]
    fn conditionals_cover_cross_product() {
        let sequences = vec![
            sequence("a", &["d1"], &["t1"]),
            sequence("b", &["d2"], &["t2"]),
        ];
        let tables = compute(&sequences, &keys(&["a", "b"]), Denominator::Population);
        assert_eq!(tables.dp_cond().len(), 4);
        assert_eq!(tables.pd_cond().len(), 4);
        assert_eq!(tables.dp_cond().get("d1", "t2"), Some(0.0));
        assert_eq!(tables.pd_cond().get("t2", "d1"), Some(0.0));
        assert_eq!(tables.dp_cond().get("d2", "t2"), Some(1.0));
    }

    #[test]
    fn empty_input_yields_empty_tables() {
        let tables = compute(&[], &keys(&[]), Denominator::Population);
        assert_eq!(tables, PriorTables::default());

        let sequences = vec![sequence("a", &["d1"], &["t1"])];
        let tables = compute(&sequences, &keys(&[]), Denominator::TrainingSubset);
        assert!(tables.dx_probs.is_empty());
        assert_eq!(tables.denominator, 0);
    }
}
