//! Empirical co-occurrence probability tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Probability keyed by an ordered code pair `(first, second)`.
///
/// Stored as nested sorted maps so lookups by `&str` need no allocation and
/// iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairTable {
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, first: &str, second: &str, value: f64) {
        self.rows
            .entry(first.to_string())
            .or_default()
            .insert(second.to_string(), value);
    }

    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        self.rows.get(first).and_then(|row| row.get(second)).copied()
    }

    /// Looks up a pair, treating absent pairs as probability zero.
    pub fn get_or_zero(&self, first: &str, second: &str) -> f64 {
        self.get(first, second).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.rows.iter().flat_map(|(first, row)| {
            row.iter()
                .map(move |(second, value)| (first.as_str(), second.as_str(), *value))
        })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(BTreeMap::is_empty)
    }
}

impl FromIterator<(String, String, f64)> for PairTable {
    fn from_iter<I: IntoIterator<Item = (String, String, f64)>>(iter: I) -> Self {
        let mut table = PairTable::new();
        for (first, second, value) in iter {
            table.rows.entry(first).or_default().insert(second, value);
        }
        table
    }
}

/// The two conditional tables consumed when attaching priors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalPriors {
    /// `P(treatment | diagnosis)` keyed `(diagnosis, treatment)`.
    pub dp_cond: PairTable,
    /// `P(diagnosis | treatment)` keyed `(treatment, diagnosis)`.
    pub pd_cond: PairTable,
}

impl ConditionalPriors {
    pub fn treatment_given_diagnosis(&self, dx: &str, proc: &str) -> f64 {
        self.dp_cond.get_or_zero(dx, proc)
    }

    pub fn diagnosis_given_treatment(&self, proc: &str, dx: &str) -> f64 {
        self.pd_cond.get_or_zero(proc, dx)
    }
}

/// Marginal, joint and conditional probabilities for one fold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorTables {
    pub dx_probs: BTreeMap<String, f64>,
    pub proc_probs: BTreeMap<String, f64>,
    /// Joint probability keyed `(diagnosis, treatment)`.
    pub dp_probs: PairTable,
    pub conditionals: ConditionalPriors,
    /// Divisor used for marginals and joints.
    pub denominator: usize,
    /// Number of sequences that contributed counts.
    pub training_sequences: usize,
}

impl PriorTables {
    pub fn dp_cond(&self) -> &PairTable {
        &self.conditionals.dp_cond
    }

    pub fn pd_cond(&self) -> &PairTable {
        &self.conditionals.pd_cond
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_table_defaults_to_zero() {
        let mut table = PairTable::new();
        table.insert("sepsis", "antibiotics", 0.25);
        assert_eq!(table.get("sepsis", "antibiotics"), Some(0.25));
        assert_eq!(table.get("antibiotics", "sepsis"), None);
        assert_eq!(table.get_or_zero("sepsis", "insulin"), 0.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn pair_table_iterates_sorted() {
        let table: PairTable = vec![
            ("b".to_string(), "y".to_string(), 0.2),
            ("a".to_string(), "z".to_string(), 0.1),
            ("a".to_string(), "x".to_string(), 0.3),
        ]
        .into_iter()
        .collect();
        let pairs: Vec<(&str, &str)> = table.iter().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(pairs, vec![("a", "x"), ("a", "z"), ("b", "y")]);
    }
}
