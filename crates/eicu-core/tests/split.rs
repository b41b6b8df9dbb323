use std::collections::HashSet;

use eicu_core::{split, split_folds};
use eicu_model::SplitOptions;
use proptest::prelude::*;

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{i}:{}", i * 7)).collect()
}

proptest! {
    #[test]
    fn split_partitions_every_key(n in 0usize..300, seed in 0u64..20, tenths in 1u32..5) {
        let input = keys(n);
        let fraction = f64::from(tenths) / 10.0;
        let parts = split(&input, seed, fraction);

        prop_assert_eq!(parts.len(), n);
        let train = parts.train_set();
        let validation = parts.validation_set();
        let test = parts.test_set();
        prop_assert!(train.is_disjoint(&validation));
        prop_assert!(train.is_disjoint(&test));
        prop_assert!(validation.is_disjoint(&test));

        let all: HashSet<String> = input.iter().cloned().collect();
        let union: HashSet<String> = train
            .union(&validation)
            .cloned()
            .chain(test.iter().cloned())
            .collect();
        prop_assert_eq!(union, all);

        let holdout = ((n as f64) * fraction).ceil() as usize;
        prop_assert_eq!(parts.train.len(), n - holdout);
        prop_assert!(parts.test.len() >= parts.validation.len());
    }
}

#[test]
fn folds_draw_independent_splits() {
    let input = keys(200);
    let folds = split_folds(&input, &SplitOptions::default()).expect("folds");
    assert_eq!(folds.len(), 5);
    // Folds are resampled, not a partition: test sets differ but may overlap.
    assert_ne!(folds[0].keys.test, folds[1].keys.test);
    for fold in &folds {
        assert_eq!(fold.keys.train.len(), 160);
        assert_eq!(fold.keys.validation.len(), 20);
        assert_eq!(fold.keys.test.len(), 20);
    }
}

#[test]
fn ninety_ten_holdout() {
    let parts = split(&keys(100), 1, 0.1);
    assert_eq!(parts.train.len(), 90);
    assert_eq!(parts.validation.len(), 5);
    assert_eq!(parts.test.len(), 5);
}
