//! Property tests for vocabulary id assignment.

use std::collections::BTreeSet;

use eicu_model::{CodeKind, Vocabulary};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ids_are_dense_and_injective(codes in prop::collection::vec("[a-e]{1,3}", 0..60)) {
        let mut vocab = Vocabulary::new(CodeKind::Diagnosis);
        for code in &codes {
            vocab.register(code.clone());
        }

        let distinct: BTreeSet<&String> = codes.iter().collect();
        prop_assert_eq!(vocab.len(), distinct.len());

        let ids: BTreeSet<u32> = codes.iter().filter_map(|code| vocab.id(code)).collect();
        let expected: BTreeSet<u32> = (0..vocab.len() as u32).collect();
        prop_assert_eq!(ids, expected);

        for (code, id) in vocab.iter() {
            prop_assert_eq!(vocab.code(id), Some(code));
        }
    }

    #[test]
    fn first_seen_order_is_preserved(codes in prop::collection::vec("[a-z]{1,2}", 1..40)) {
        let vocab = Vocabulary::from_codes(CodeKind::Treatment, codes.clone());
        let mut seen = BTreeSet::new();
        let first_seen: Vec<String> = codes
            .into_iter()
            .filter(|code| seen.insert(code.clone()))
            .collect();
        prop_assert_eq!(vocab.codes(), first_seen.as_slice());
    }
}
