//! End-to-end preparation run.
//!
//! Stages: ingest the source tables, build sequences and vocabularies, then
//! for each fold compute training priors, write them, reload the conditional
//! tables and write the three record sets. A manifest closes the run.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use eicu_core::{
    Fold, Progress, SequenceBuilder, SequenceSet, compute_prior_tables, inject_with_progress,
    split_folds,
};
use eicu_ingest::{IngestReport, SourceFiles, load_encounters};
use eicu_model::{CodeKind, PipelineOptions};
use eicu_output::{
    OutputLayout, RunManifest, SplitName, read_conditionals, write_prior_tables, write_records,
    write_vocabulary,
};

use crate::logging::redact_value;
use crate::types::{FoldSummary, RunResult};

pub fn run(
    source_dir: &Path,
    output_dir: &Path,
    options: &PipelineOptions,
    progress: &mut dyn Progress,
) -> Result<RunResult> {
    let run_start = Instant::now();
    options.validate().context("invalid options")?;

    // Stage 1: ingest
    let ingest_span = info_span!("ingest", source = %source_dir.display());
    let ingest_start = Instant::now();
    let (store, report) = ingest_span.in_scope(|| -> Result<_> {
        let files = SourceFiles::in_dir(source_dir).context("locate source tables")?;
        let loaded = load_encounters(&files, &options.ingest).context("load encounters")?;
        log_unknown_encounters(&loaded.1);
        Ok(loaded)
    })?;
    info!(
        encounters = store.len(),
        excluded_by_duration = report.admissions.excluded_by_duration,
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    // Stage 2: sequences and vocabularies
    let builder = SequenceBuilder::new(options.build).context("invalid build options")?;
    let set = builder.build_with_progress(&store, progress);
    drop(store);

    let layout = OutputLayout::new(output_dir);
    layout.create_root().context("create output directory")?;
    let mut manifest = RunManifest::new(
        serde_json::to_value(options).context("serialize options")?,
        options.split.num_folds,
    );
    for kind in [CodeKind::Diagnosis, CodeKind::Treatment] {
        let vocab = set.vocabulary(kind);
        let path = layout.vocabulary(kind);
        write_vocabulary(&path, vocab).with_context(|| format!("write {kind} vocabulary"))?;
        manifest.add_file(&layout, &path, Some(vocab.len()))?;
    }

    // Stage 3: folds
    let folds = split_folds(&set.keys, &options.split).context("split sequences")?;
    let mut fold_summaries = Vec::with_capacity(folds.len());
    for fold in &folds {
        let span = info_span!("fold", fold = fold.index, seed = fold.seed);
        let summary = span
            .in_scope(|| {
                write_fold(fold, &set, &layout, options, &mut manifest, &mut *progress)
            })
            .with_context(|| format!("write {}", fold.name()))?;
        fold_summaries.push(summary);
    }

    let manifest_path = layout.manifest();
    manifest.write(&manifest_path).context("write run manifest")?;

    let duration_ms = run_start.elapsed().as_millis();
    info!(
        folds = fold_summaries.len(),
        artifacts = manifest.artifacts.len(),
        duration_ms,
        "run complete"
    );
    Ok(RunResult {
        output_dir: output_dir.to_path_buf(),
        manifest: manifest_path,
        ingest: report,
        build: set.summary,
        dx_vocab: set.dx_vocab.len(),
        proc_vocab: set.proc_vocab.len(),
        folds: fold_summaries,
        duration_ms,
    })
}

fn write_fold(
    fold: &Fold,
    set: &SequenceSet,
    layout: &OutputLayout,
    options: &PipelineOptions,
    manifest: &mut RunManifest,
    progress: &mut dyn Progress,
) -> Result<FoldSummary> {
    let start = Instant::now();
    let stats_dir = layout.create_fold(fold.index)?;

    let tables = compute_prior_tables(
        &set.sequences,
        &fold.keys.train_set(),
        options.prior.denominator,
    );
    for path in write_prior_tables(&stats_dir, &tables)? {
        manifest.add_file(layout, &path, None)?;
    }
    // Injection reads the persisted tables so record sets match what was written.
    let conditionals = read_conditionals(&stats_dir).context("reload conditional priors")?;

    for split in SplitName::ALL {
        let keys: HashSet<String> = match split {
            SplitName::Train => fold.keys.train_set(),
            SplitName::Validation => fold.keys.validation_set(),
            SplitName::Test => fold.keys.test_set(),
        };
        let sequences = inject_with_progress(
            &set.sequences,
            &conditionals,
            &keys,
            options.prior.max_positions,
            progress,
        )
        .with_context(|| format!("attach priors to {split} split"))?;
        let path = layout.split_file(fold.index, split);
        let written = write_records(&path, &sequences)?;
        manifest.add_file(layout, &path, Some(written))?;
        debug!(split = %split, records = written, "record set written");
    }

    info!(
        train = fold.keys.train.len(),
        validation = fold.keys.validation.len(),
        test = fold.keys.test.len(),
        duration_ms = start.elapsed().as_millis(),
        "fold complete"
    );
    Ok(FoldSummary {
        index: fold.index,
        seed: fold.seed,
        train: fold.keys.train.len(),
        validation: fold.keys.validation.len(),
        test: fold.keys.test.len(),
        dx_priors: tables.dx_probs.len(),
        proc_priors: tables.proc_probs.len(),
    })
}

fn log_unknown_encounters(report: &IngestReport) {
    for table in &report.code_tables {
        if table.stats.dropped == 0 {
            continue;
        }
        let examples: Vec<&str> = table
            .stats
            .unknown_examples
            .iter()
            .map(|id| redact_value(id))
            .collect();
        debug!(
            table = %table.table,
            examples = ?examples,
            "unknown encounter ids"
        );
    }
}
