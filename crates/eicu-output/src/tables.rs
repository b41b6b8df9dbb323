//! Prior probability table artifacts.
//!
//! Each table is its own JSON document with entries sorted by key, so the
//! conditional tables can be reloaded without the marginals.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use eicu_model::{ConditionalPriors, PairTable, PriorTables};

use crate::FORMAT_VERSION;
use crate::error::{OutputError, Result};
use crate::json::{read_json, write_json};

pub const DX_PROBS: &str = "dx_probs";
pub const PROC_PROBS: &str = "proc_probs";
pub const DP_PROBS: &str = "dp_probs";
pub const DP_COND_PROBS: &str = "dp_cond_probs";
pub const PD_COND_PROBS: &str = "pd_cond_probs";

pub const TABLE_NAMES: [&str; 5] = [DX_PROBS, PROC_PROBS, DP_PROBS, DP_COND_PROBS, PD_COND_PROBS];

pub fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.json"))
}

#[derive(Debug, Serialize, Deserialize)]
struct TableDoc<E> {
    format_version: u32,
    table: String,
    entries: Vec<E>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MarginalEntry {
    code: String,
    p: f64,
}

/// `first` and `second` follow the table's key order, e.g. `(treatment,
/// diagnosis)` for `pd_cond_probs`.
#[derive(Debug, Serialize, Deserialize)]
struct PairEntry {
    first: String,
    second: String,
    p: f64,
}

fn marginal_doc(table: &str, probs: &BTreeMap<String, f64>) -> TableDoc<MarginalEntry> {
    TableDoc {
        format_version: FORMAT_VERSION,
        table: table.to_string(),
        entries: probs
            .iter()
            .map(|(code, p)| MarginalEntry {
                code: code.clone(),
                p: *p,
            })
            .collect(),
    }
}

fn pair_doc(table: &str, pairs: &PairTable) -> TableDoc<PairEntry> {
    TableDoc {
        format_version: FORMAT_VERSION,
        table: table.to_string(),
        entries: pairs
            .iter()
            .map(|(first, second, p)| PairEntry {
                first: first.to_string(),
                second: second.to_string(),
                p,
            })
            .collect(),
    }
}

/// Writes the five tables into `dir` and returns the written paths.
pub fn write_prior_tables(dir: &Path, tables: &PriorTables) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(TABLE_NAMES.len());

    for (table, probs) in [(DX_PROBS, &tables.dx_probs), (PROC_PROBS, &tables.proc_probs)] {
        let path = table_path(dir, table);
        write_json(&path, &marginal_doc(table, probs))?;
        written.push(path);
    }
    for (table, pairs) in [
        (DP_PROBS, &tables.dp_probs),
        (DP_COND_PROBS, tables.dp_cond()),
        (PD_COND_PROBS, tables.pd_cond()),
    ] {
        let path = table_path(dir, table);
        write_json(&path, &pair_doc(table, pairs))?;
        written.push(path);
    }

    debug!(dir = %dir.display(), tables = written.len(), "prior tables written");
    Ok(written)
}

fn read_doc<E: serde::de::DeserializeOwned>(dir: &Path, table: &str) -> Result<TableDoc<E>> {
    let path = table_path(dir, table);
    let doc: TableDoc<E> = read_json(&path)?;
    if doc.format_version != FORMAT_VERSION {
        return Err(OutputError::UnsupportedVersion {
            path,
            found: doc.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if doc.table != table {
        return Err(OutputError::ContentMismatch {
            path,
            expected: table.to_string(),
            found: doc.table,
        });
    }
    Ok(doc)
}

fn read_marginals(dir: &Path, table: &str) -> Result<BTreeMap<String, f64>> {
    let doc: TableDoc<MarginalEntry> = read_doc(dir, table)?;
    Ok(doc.entries.into_iter().map(|e| (e.code, e.p)).collect())
}

fn read_pairs(dir: &Path, table: &str) -> Result<PairTable> {
    let doc: TableDoc<PairEntry> = read_doc(dir, table)?;
    Ok(doc
        .entries
        .into_iter()
        .map(|e| (e.first, e.second, e.p))
        .collect())
}

/// Loads only the two conditional tables.
pub fn read_conditionals(dir: &Path) -> Result<ConditionalPriors> {
    Ok(ConditionalPriors {
        dp_cond: read_pairs(dir, DP_COND_PROBS)?,
        pd_cond: read_pairs(dir, PD_COND_PROBS)?,
    })
}

/// Loads all five tables.
///
/// The counts behind the tables are not persisted, so `denominator` and
/// `training_sequences` come back as zero.
pub fn read_prior_tables(dir: &Path) -> Result<PriorTables> {
    Ok(PriorTables {
        dx_probs: read_marginals(dir, DX_PROBS)?,
        proc_probs: read_marginals(dir, PROC_PROBS)?,
        dp_probs: read_pairs(dir, DP_PROBS)?,
        conditionals: read_conditionals(dir)?,
        denominator: 0,
        training_sequences: 0,
    })
}
