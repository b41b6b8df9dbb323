//! JSON Lines record sets.
//!
//! One encoded sequence per line. Field names match the feature names the
//! downstream training code reads.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use eicu_model::{EncodedSequence, PriorGuide};

use crate::error::{OutputError, Result};

/// Destination for encoded sequences.
pub trait RecordSink {
    fn write_record(&mut self, sequence: &EncodedSequence) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn records_written(&self) -> usize;

    fn write_all(&mut self, sequences: &[EncodedSequence]) -> Result<usize> {
        for sequence in sequences {
            self.write_record(sequence)?;
        }
        self.flush()?;
        Ok(self.records_written())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "label.expired")]
    pub label_expired: u8,
    #[serde(rename = "label.readmission")]
    pub label_readmission: u8,
    pub dx_ids: Vec<String>,
    pub dx_ints: Vec<u32>,
    pub proc_ids: Vec<String>,
    pub proc_ints: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_indices: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_values: Option<Vec<f32>>,
}

impl From<&EncodedSequence> for SequenceRecord {
    fn from(sequence: &EncodedSequence) -> Self {
        Self {
            patient_id: sequence.key.clone(),
            label_expired: sequence.label_expired,
            label_readmission: sequence.label_readmission,
            dx_ids: sequence.dx_ids.clone(),
            dx_ints: sequence.dx_ints.clone(),
            proc_ids: sequence.proc_ids.clone(),
            proc_ints: sequence.proc_ints.clone(),
            prior_indices: sequence.prior.as_ref().map(|p| p.indices.clone()),
            prior_values: sequence.prior.as_ref().map(|p| p.values.clone()),
        }
    }
}

impl TryFrom<SequenceRecord> for EncodedSequence {
    type Error = OutputError;

    fn try_from(record: SequenceRecord) -> Result<Self> {
        let prior = match (record.prior_indices, record.prior_values) {
            (None, None) => None,
            (Some(indices), Some(values)) => {
                if indices.len() != values.len() * 2 {
                    return Err(OutputError::InvalidRecord {
                        key: record.patient_id,
                        reason: format!(
                            "{} prior indices for {} values",
                            indices.len(),
                            values.len()
                        ),
                    });
                }
                Some(PriorGuide { indices, values })
            }
            _ => {
                return Err(OutputError::InvalidRecord {
                    key: record.patient_id,
                    reason: "prior indices and values must appear together".to_string(),
                });
            }
        };
        Ok(EncodedSequence {
            key: record.patient_id,
            label_expired: record.label_expired,
            label_readmission: record.label_readmission,
            dx_ids: record.dx_ids,
            dx_ints: record.dx_ints,
            proc_ids: record.proc_ids,
            proc_ints: record.proc_ints,
            prior,
        })
    }
}

/// Writes records as newline-delimited JSON.
pub struct JsonLinesWriter<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Flushes and returns the inner writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl JsonLinesWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| OutputError::file(path, e))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> RecordSink for JsonLinesWriter<W> {
    fn write_record(&mut self, sequence: &EncodedSequence) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &SequenceRecord::from(sequence))?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.written
    }
}

/// Writes `sequences` to a new file at `path`.
pub fn write_records(path: &Path, sequences: &[EncodedSequence]) -> Result<usize> {
    let mut writer = JsonLinesWriter::create(path)?;
    writer
        .write_all(sequences)
        .map_err(|e| match e {
            OutputError::Io(source) => OutputError::file(path, source),
            other => other,
        })
}

/// Reads a record set. Blank lines are skipped.
pub fn read_records(path: &Path) -> Result<Vec<EncodedSequence>> {
    let file = File::open(path).map_err(|e| OutputError::file(path, e))?;
    let mut sequences = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| OutputError::file(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: SequenceRecord =
            serde_json::from_str(&line).map_err(|source| OutputError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
        sequences.push(EncodedSequence::try_from(record)?);
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(prior: Option<PriorGuide>) -> EncodedSequence {
        EncodedSequence {
            key: "7:70".to_string(),
            label_expired: 1,
            label_readmission: 0,
            dx_ids: vec!["sepsis".to_string()],
            dx_ints: vec![0],
            proc_ids: vec!["antibiotics".to_string()],
            proc_ints: vec![0],
            prior,
        }
    }

    #[test]
    fn record_uses_feature_names() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        writer.write_record(&sequence(None)).expect("write");
        assert_eq!(writer.records_written(), 1);
        let bytes = writer.into_inner().expect("inner");
        let line = String::from_utf8(bytes).expect("utf8");
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim()).expect("json");
        assert_eq!(value["patientId"], "7:70");
        assert_eq!(value["label.expired"], 1);
        assert_eq!(value["label.readmission"], 0);
        assert!(value.get("prior_indices").is_none());
    }

    #[test]
    fn prior_fields_must_agree() {
        let mut record = SequenceRecord::from(&sequence(Some(PriorGuide {
            indices: vec![0, 50, 50, 0],
            values: vec![1.0, 0.5],
        })));
        assert!(EncodedSequence::try_from(record.clone()).is_ok());

        record.prior_values = None;
        let err = EncodedSequence::try_from(record.clone()).expect_err("half prior");
        assert!(err.to_string().contains("together"));

        record.prior_values = Some(vec![1.0]);
        assert!(EncodedSequence::try_from(record).is_err());
    }
}
