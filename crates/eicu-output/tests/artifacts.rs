use std::fs;

use eicu_model::{CodeKind, EncodedSequence, PairTable, PriorGuide, PriorTables, Vocabulary};
use eicu_output::{
    OutputError, OutputLayout, RunManifest, SplitName, TABLE_NAMES, read_conditionals,
    read_prior_tables, read_records, read_vocabulary, table_path, write_prior_tables,
    write_records, write_vocabulary,
};
use tempfile::tempdir;

fn sample_tables() -> PriorTables {
    let mut tables = PriorTables {
        denominator: 4,
        training_sequences: 2,
        ..PriorTables::default()
    };
    tables.dx_probs.insert("sepsis".to_string(), 0.5);
    tables.dx_probs.insert("aki".to_string(), 0.25);
    tables.proc_probs.insert("antibiotics".to_string(), 0.5);
    tables.dp_probs.insert("sepsis", "antibiotics", 0.5);
    tables.dp_probs.insert("aki", "antibiotics", 0.25);
    tables.conditionals.dp_cond.insert("sepsis", "antibiotics", 1.0);
    tables.conditionals.dp_cond.insert("aki", "antibiotics", 1.0);
    tables.conditionals.pd_cond.insert("antibiotics", "sepsis", 1.0);
    tables.conditionals.pd_cond.insert("antibiotics", "aki", 0.5);
    tables
}

#[test]
fn vocabulary_keeps_id_order() {
    let dir = tempdir().expect("tempdir");
    let layout = OutputLayout::new(dir.path());
    let vocab = Vocabulary::from_codes(CodeKind::Diagnosis, ["sepsis", "aki", "stroke"]);
    let path = layout.vocabulary(CodeKind::Diagnosis);
    write_vocabulary(&path, &vocab).expect("write");

    let loaded = read_vocabulary(&path, CodeKind::Diagnosis).expect("read");
    assert_eq!(loaded.id("aki"), Some(1));
    assert_eq!(loaded.code(2), Some("stroke"));

    let err = read_vocabulary(&path, CodeKind::Treatment).expect_err("wrong kind");
    assert!(matches!(err, OutputError::ContentMismatch { .. }));
}

#[test]
fn vocabulary_rejects_other_versions() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("dx_vocab.json");
    fs::write(
        &path,
        r#"{"format_version": 2, "kind": "diagnosis", "codes": []}"#,
    )
    .expect("write");
    let err = read_vocabulary(&path, CodeKind::Diagnosis).expect_err("version");
    assert!(matches!(
        err,
        OutputError::UnsupportedVersion { found: 2, .. }
    ));
}

#[test]
fn vocabulary_rejects_repeated_codes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("proc_vocab.json");
    fs::write(
        &path,
        r#"{"format_version": 1, "kind": "treatment", "codes": ["cpr", "insulin", "cpr"]}"#,
    )
    .expect("write");
    let err = read_vocabulary(&path, CodeKind::Treatment).expect_err("duplicate");
    assert!(matches!(
        err,
        OutputError::ContentMismatch { ref found, .. } if found.contains("cpr")
    ));
}

#[test]
fn malformed_vocabulary_reports_line() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("dx_vocab.json");
    fs::write(&path, "{\"format_version\": 1,\n\"kind\": diagnosis}\n").expect("write");
    let err = read_vocabulary(&path, CodeKind::Diagnosis).expect_err("malformed");
    assert!(matches!(err, OutputError::Parse { line: 2, .. }));
}

#[test]
fn prior_tables_write_five_sorted_files() {
    let dir = tempdir().expect("tempdir");
    let written = write_prior_tables(dir.path(), &sample_tables()).expect("write");
    assert_eq!(written.len(), 5);
    for table in TABLE_NAMES {
        assert!(table_path(dir.path(), table).is_file(), "{table} missing");
    }

    let text = fs::read_to_string(table_path(dir.path(), "dx_probs")).expect("read");
    assert_eq!(text.lines().count(), 1, "tables are written compact");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value["table"], "dx_probs");
    assert_eq!(value["entries"][0]["code"], "aki");
    assert_eq!(value["entries"][1]["code"], "sepsis");
}

#[test]
fn conditionals_reload_without_marginals() {
    let dir = tempdir().expect("tempdir");
    let tables = sample_tables();
    write_prior_tables(dir.path(), &tables).expect("write");
    fs::remove_file(table_path(dir.path(), "dx_probs")).expect("remove");

    let conditionals = read_conditionals(dir.path()).expect("conditionals");
    assert_eq!(conditionals, tables.conditionals);
    assert_eq!(conditionals.diagnosis_given_treatment("antibiotics", "aki"), 0.5);
    assert_eq!(conditionals.treatment_given_diagnosis("stroke", "antibiotics"), 0.0);

    assert!(read_prior_tables(dir.path()).is_err());
}

#[test]
fn full_tables_reload() {
    let dir = tempdir().expect("tempdir");
    let tables = sample_tables();
    write_prior_tables(dir.path(), &tables).expect("write");
    let loaded = read_prior_tables(dir.path()).expect("read");
    assert_eq!(loaded.dx_probs, tables.dx_probs);
    assert_eq!(loaded.dp_probs, tables.dp_probs);
    assert_eq!(loaded.conditionals, tables.conditionals);
    assert_eq!(loaded.dp_probs.len(), 2);
    assert_eq!(PairTable::new().len(), 0);
}

#[test]
fn records_and_manifest() {
    let dir = tempdir().expect("tempdir");
    let layout = OutputLayout::new(dir.path().join("out"));
    layout.create_root().expect("root");
    layout.create_fold(0).expect("fold");

    let sequences = vec![
        EncodedSequence {
            key: "1:10".to_string(),
            label_expired: 0,
            label_readmission: 1,
            dx_ids: vec!["sepsis".to_string(), "aki".to_string()],
            dx_ints: vec![0, 1],
            proc_ids: vec!["antibiotics".to_string()],
            proc_ints: vec![0],
            prior: Some(PriorGuide {
                indices: vec![0, 50, 1, 50, 50, 0, 50, 1],
                values: vec![1.0, 1.0, 1.0, 0.5],
            }),
        },
        EncodedSequence {
            key: "2:20".to_string(),
            label_expired: 1,
            label_readmission: 0,
            dx_ids: vec!["stroke".to_string()],
            dx_ints: vec![2],
            proc_ids: vec!["thrombolysis".to_string()],
            proc_ints: vec![1],
            prior: Some(PriorGuide {
                indices: vec![0, 50, 50, 0],
                values: vec![0.0, 0.0],
            }),
        },
    ];
    let path = layout.split_file(0, SplitName::Train);
    assert_eq!(write_records(&path, &sequences).expect("records"), 2);
    assert_eq!(read_records(&path).expect("read"), sequences);

    let mut manifest = RunManifest::new(serde_json::json!({ "num_folds": 1 }), 1);
    manifest.add_file(&layout, &path, Some(2)).expect("hash");
    manifest.write(&layout.manifest()).expect("manifest");

    let loaded = RunManifest::read(&layout.manifest()).expect("read manifest");
    let entry = loaded.artifact("fold_0/train.jsonl").expect("entry");
    assert_eq!(entry.records, Some(2));
    assert_eq!(entry.sha256.len(), 64);
    assert!(loaded.verify(&layout).expect("verify").is_empty());

    fs::write(&path, "").expect("truncate");
    assert_eq!(
        loaded.verify(&layout).expect("verify"),
        vec!["fold_0/train.jsonl".to_string()]
    );
}

#[test]
fn malformed_record_reports_line() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.jsonl");
    fs::write(&path, "\n{not json}\n").expect("write");
    let err = read_records(&path).expect_err("parse");
    assert!(matches!(err, OutputError::Parse { line: 2, .. }));
}
