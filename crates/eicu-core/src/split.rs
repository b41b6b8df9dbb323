//! Repeated random train/validation/test partitions.
//!
//! Every fold draws its own split over the whole key population with
//! `seed = fold_index`, so folds overlap; this is not k-fold cross
//! validation. Both stages of one split reseed with the same seed.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use eicu_model::SplitOptions;

use crate::error::Result;

/// Share of the holdout that becomes the test set.
const TEST_SHARE_OF_HOLDOUT: f64 = 0.5;

/// One train/validation/test partition of the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitKeys {
    pub train: Vec<String>,
    pub validation: Vec<String>,
    pub test: Vec<String>,
}

impl SplitKeys {
    pub fn train_set(&self) -> HashSet<String> {
        self.train.iter().cloned().collect()
    }

    pub fn validation_set(&self) -> HashSet<String> {
        self.validation.iter().cloned().collect()
    }

    pub fn test_set(&self) -> HashSet<String> {
        self.test.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A numbered split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub seed: u64,
    pub keys: SplitKeys,
}

impl Fold {
    /// Directory name used for the fold's artifacts.
    pub fn name(&self) -> String {
        format!("fold_{}", self.index)
    }
}

/// Shuffles a copy of `keys` and returns `(kept, held_out)`, holding out
/// `ceil(len * fraction)` keys.
pub fn shuffle_split(keys: &[String], fraction: f64, seed: u64) -> (Vec<String>, Vec<String>) {
    let mut shuffled = keys.to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);
    let held_out = ((shuffled.len() as f64) * fraction).ceil() as usize;
    let held_out = held_out.min(shuffled.len());
    let kept = shuffled.split_off(held_out);
    (kept, shuffled)
}

/// Two-stage split: hold out `holdout_fraction` of the keys, then halve the
/// holdout into validation and test using the same seed.
pub fn split(keys: &[String], seed: u64, holdout_fraction: f64) -> SplitKeys {
    let (train, remainder) = shuffle_split(keys, holdout_fraction, seed);
    let (validation, test) = shuffle_split(&remainder, TEST_SHARE_OF_HOLDOUT, seed);
    SplitKeys {
        train,
        validation,
        test,
    }
}

/// Builds `options.num_folds` independent splits seeded by fold index.
pub fn split_folds(keys: &[String], options: &SplitOptions) -> Result<Vec<Fold>> {
    options.validate()?;
    let folds = (0..options.num_folds)
        .map(|index| {
            let seed = index as u64;
            let keys = split(keys, seed, options.holdout_fraction);
            debug!(
                fold = index,
                train = keys.train.len(),
                validation = keys.validation.len(),
                test = keys.test.len(),
                "fold split"
            );
            Fold { index, seed, keys }
        })
        .collect();
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}:e{i}")).collect()
    }

    #[test]
    fn eighty_ten_ten_sizes() {
        let split = split(&keys(100), 0, 0.2);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.validation.len(), 10);
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn holdout_rounds_up() {
        // ceil(7 * 0.2) = 2 held out, ceil(2 * 0.5) = 1 test.
        let split = split(&keys(7), 3, 0.2);
        assert_eq!(split.train.len(), 5);
        assert_eq!(split.validation.len(), 1);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn same_seed_same_split() {
        let input = keys(50);
        assert_eq!(split(&input, 4, 0.1), split(&input, 4, 0.1));
    }

    #[test]
    fn empty_input_gives_empty_split() {
        let split = split(&[], 0, 0.2);
        assert!(split.is_empty());
    }

    #[test]
    fn folds_use_index_as_seed() {
        let input = keys(30);
        let folds = split_folds(&input, &SplitOptions::default()).unwrap();
        assert_eq!(folds.len(), 5);
        for fold in &folds {
            assert_eq!(fold.seed, fold.index as u64);
            assert_eq!(fold.keys, split(&input, fold.seed, 0.2));
        }
        assert_eq!(folds[2].name(), "fold_2");
    }

    #[test]
    fn zero_folds_is_invalid() {
        let options = SplitOptions {
            num_folds: 0,
            ..SplitOptions::default()
        };
        assert!(split_folds(&keys(3), &options).is_err());
    }
}
