pub mod encounter;
pub mod error;
pub mod options;
pub mod priors;
pub mod sequence;
pub mod vocabulary;

pub use encounter::{CodeKind, EXPIRED_STATUS, Encounter, distinct_codes, has_duplicates};
pub use error::{ModelError, Result};
pub use options::{
    BuildOptions, DEFAULT_DURATION_THRESHOLD_MINUTES, DEFAULT_HOLDOUT_FRACTION,
    DEFAULT_MAX_NUM_CODES, DEFAULT_MIN_NUM_CODES, DEFAULT_NUM_FOLDS, Denominator, IngestOptions,
    PipelineOptions, PriorOptions, SplitOptions,
};
pub use priors::{ConditionalPriors, PairTable, PriorTables};
pub use sequence::{EncodedSequence, PriorGuide};
pub use vocabulary::Vocabulary;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encounter_key_joins_patient_and_stay() {
        let encounter = Encounter::new("P1", "E1", -500, false, true);
        assert_eq!(encounter.key(), "P1:E1");
        assert!(encounter.codes(CodeKind::Diagnosis).is_empty());
    }

    #[test]
    fn distinct_codes_keeps_first_occurrence_order() {
        let codes: Vec<String> = ["b", "a", "b", "c", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(distinct_codes(&codes), vec!["b", "a", "c"]);
        assert!(has_duplicates(&codes));
        assert!(!has_duplicates(&distinct_codes(&codes)));
    }

    #[test]
    fn default_options_validate() {
        let options = PipelineOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.split.num_folds, 5);
        assert_eq!(options.build.max_unique_codes, 50);
        assert_eq!(options.prior.denominator, Denominator::Population);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let build = BuildOptions {
            min_unique_codes: 10,
            max_unique_codes: 2,
            ..BuildOptions::default()
        };
        assert!(matches!(
            build.validate(),
            Err(ModelError::InvalidOption {
                name: "min_unique_codes",
                ..
            })
        ));

        let split = SplitOptions {
            holdout_fraction: 1.0,
            ..SplitOptions::default()
        };
        assert!(split.validate().is_err());

        let options = PipelineOptions {
            prior: PriorOptions {
                max_positions: 10,
                ..PriorOptions::default()
            },
            ..PipelineOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
