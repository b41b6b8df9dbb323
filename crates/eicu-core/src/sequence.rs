//! Encoding encounters into vocabulary-indexed sequences.

use tracing::{info, info_span};

use eicu_ingest::EncounterStore;
use eicu_model::{
    BuildOptions, CodeKind, EncodedSequence, Encounter, Vocabulary, distinct_codes,
    has_duplicates,
};

use crate::error::Result;
use crate::progress::{NoProgress, Progress};

/// Counts collected while building sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub encounters: usize,
    pub kept: usize,
    pub duplicate_dropped: usize,
    pub min_dx_cut: usize,
    pub min_treatment_cut: usize,
    pub max_dx_cut: usize,
    pub max_treatment_cut: usize,
    pub expired: usize,
    pub readmission: usize,
    pub dx_codes: usize,
    pub treatment_codes: usize,
    pub unique_dx_codes: usize,
    pub unique_treatment_codes: usize,
}

impl BuildSummary {
    /// Encounters dropped by the unique-code bounds.
    pub fn threshold_dropped(&self) -> usize {
        self.min_dx_cut + self.min_treatment_cut + self.max_dx_cut + self.max_treatment_cut
    }

    pub fn dropped(&self) -> usize {
        self.duplicate_dropped + self.threshold_dropped()
    }

    pub fn avg_dx_codes(&self) -> f64 {
        per_kept(self.dx_codes, self.kept)
    }

    pub fn avg_treatment_codes(&self) -> f64 {
        per_kept(self.treatment_codes, self.kept)
    }

    pub fn avg_unique_dx_codes(&self) -> f64 {
        per_kept(self.unique_dx_codes, self.kept)
    }

    pub fn avg_unique_treatment_codes(&self) -> f64 {
        per_kept(self.unique_treatment_codes, self.kept)
    }
}

fn per_kept(total: usize, kept: usize) -> f64 {
    if kept == 0 {
        0.0
    } else {
        total as f64 / kept as f64
    }
}

/// Output of [`SequenceBuilder::build`].
#[derive(Debug, Clone)]
pub struct SequenceSet {
    /// Sequence keys in emission order.
    pub keys: Vec<String>,
    pub sequences: Vec<EncodedSequence>,
    pub dx_vocab: Vocabulary,
    pub proc_vocab: Vocabulary,
    pub summary: BuildSummary,
}

impl SequenceSet {
    pub fn vocabulary(&self, kind: CodeKind) -> &Vocabulary {
        match kind {
            CodeKind::Diagnosis => &self.dx_vocab,
            CodeKind::Treatment => &self.proc_vocab,
        }
    }
}

/// Why an encounter was not encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    DuplicateCodes,
    TooFewDiagnoses,
    TooFewTreatments,
    TooManyDiagnoses,
    TooManyTreatments,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceBuilder {
    options: BuildOptions,
}

impl SequenceBuilder {
    pub fn new(options: BuildOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Checks the duplicate policy and unique-code bounds.
    ///
    /// Bounds are checked min-diagnosis, min-treatment, max-diagnosis,
    /// max-treatment; the first failure decides the reason.
    pub fn screen(&self, encounter: &Encounter) -> Option<DropReason> {
        if self.options.skip_duplicates
            && (has_duplicates(&encounter.dx_codes) || has_duplicates(&encounter.treatment_codes))
        {
            return Some(DropReason::DuplicateCodes);
        }
        let unique_dx = distinct_count(&encounter.dx_codes);
        let unique_treatments = distinct_count(&encounter.treatment_codes);
        let BuildOptions {
            min_unique_codes: min,
            max_unique_codes: max,
            ..
        } = self.options;
        if unique_dx < min {
            Some(DropReason::TooFewDiagnoses)
        } else if unique_treatments < min {
            Some(DropReason::TooFewTreatments)
        } else if unique_dx > max {
            Some(DropReason::TooManyDiagnoses)
        } else if unique_treatments > max {
            Some(DropReason::TooManyTreatments)
        } else {
            None
        }
    }

    pub fn build(&self, store: &EncounterStore) -> SequenceSet {
        self.build_with_progress(store, &mut NoProgress)
    }

    /// Encodes the store's encounters in insertion order.
    ///
    /// Vocabularies only ever see codes of kept encounters.
    pub fn build_with_progress(
        &self,
        store: &EncounterStore,
        progress: &mut dyn Progress,
    ) -> SequenceSet {
        let span = info_span!("build", encounters = store.len());
        let _guard = span.enter();

        let mut dx_vocab = Vocabulary::new(CodeKind::Diagnosis);
        let mut proc_vocab = Vocabulary::new(CodeKind::Treatment);
        let mut keys = Vec::new();
        let mut sequences = Vec::new();
        let mut summary = BuildSummary {
            encounters: store.len(),
            ..BuildSummary::default()
        };

        progress.start("encode", store.len() as u64);
        for encounter in store.iter() {
            progress.advance(1);
            if let Some(reason) = self.screen(encounter) {
                match reason {
                    DropReason::DuplicateCodes => summary.duplicate_dropped += 1,
                    DropReason::TooFewDiagnoses => summary.min_dx_cut += 1,
                    DropReason::TooFewTreatments => summary.min_treatment_cut += 1,
                    DropReason::TooManyDiagnoses => summary.max_dx_cut += 1,
                    DropReason::TooManyTreatments => summary.max_treatment_cut += 1,
                }
                continue;
            }

            let sequence = encode(encounter, &mut dx_vocab, &mut proc_vocab);
            summary.kept += 1;
            summary.dx_codes += encounter.dx_codes.len();
            summary.treatment_codes += encounter.treatment_codes.len();
            summary.unique_dx_codes += sequence.dx_ids.len();
            summary.unique_treatment_codes += sequence.proc_ids.len();
            summary.expired += usize::from(encounter.expired);
            summary.readmission += usize::from(encounter.readmission);
            keys.push(sequence.key.clone());
            sequences.push(sequence);
        }
        progress.finish();

        info!(
            kept = summary.kept,
            duplicate_dropped = summary.duplicate_dropped,
            min_dx_cut = summary.min_dx_cut,
            min_treatment_cut = summary.min_treatment_cut,
            max_dx_cut = summary.max_dx_cut,
            max_treatment_cut = summary.max_treatment_cut,
            dx_vocab = dx_vocab.len(),
            proc_vocab = proc_vocab.len(),
            avg_unique_dx = summary.avg_unique_dx_codes(),
            avg_unique_treatments = summary.avg_unique_treatment_codes(),
            "sequences built"
        );

        SequenceSet {
            keys,
            sequences,
            dx_vocab,
            proc_vocab,
            summary,
        }
    }
}

/// Registers an encounter's codes and emits its sequence.
fn encode(
    encounter: &Encounter,
    dx_vocab: &mut Vocabulary,
    proc_vocab: &mut Vocabulary,
) -> EncodedSequence {
    let dx_ids = distinct_codes(&encounter.dx_codes);
    let proc_ids = distinct_codes(&encounter.treatment_codes);
    let dx_ints = dx_ids.iter().map(|code| dx_vocab.register(code.as_str())).collect();
    let proc_ints = proc_ids
        .iter()
        .map(|code| proc_vocab.register(code.as_str()))
        .collect();
    EncodedSequence {
        key: encounter.key(),
        label_expired: u8::from(encounter.expired),
        label_readmission: u8::from(encounter.readmission),
        dx_ids,
        dx_ints,
        proc_ids,
        proc_ints,
        prior: None,
    }
}

fn distinct_count(codes: &[String]) -> usize {
    let mut seen = std::collections::HashSet::with_capacity(codes.len());
    codes.iter().filter(|code| seen.insert(code.as_str())).count()
}
