use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{OutputError, Result};

/// Writes `value` as a single compact JSON line.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_document(path, value, false)
}

/// Writes `value` as indented JSON, for small documents people read.
pub(crate) fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_document(path, value, true)
}

fn write_document<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let file = File::create(path).map_err(|e| OutputError::file(path, e))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| OutputError::file(path, e))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| OutputError::file(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| OutputError::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}
