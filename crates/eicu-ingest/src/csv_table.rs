use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// An in-memory CSV table with a single header row.
///
/// Headers are normalized; cells are kept as read. Typed accessors on
/// [`TableRow`] trim, while code values are taken verbatim.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    /// Table name used in error messages (usually the file name).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Cell value with surrounding whitespace and byte-order marks removed.
pub fn trim_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

impl CsvTable {
    /// Builds a table from literal headers and rows; rows are padded or
    /// truncated to the header width.
    pub fn from_rows<H, R, C>(name: impl Into<String>, headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row
                    .into_iter()
                    .map(|cell| cell.as_ref().to_string())
                    .collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(column))
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| IngestError::MissingColumn {
                column: column.to_string(),
                table: self.name.clone(),
            })
    }

    /// Rows as key-value records.
    pub fn records(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().enumerate().map(move |(index, values)| TableRow {
            table: self,
            index,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of a [`CsvTable`] with typed cell accessors.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a CsvTable,
    index: usize,
    values: &'a [String],
}

impl<'a> TableRow<'a> {
    /// Zero-based data row number (header excluded).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Trimmed cell value.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.raw(column).map(trim_cell)
    }

    /// Cell value exactly as read.
    pub fn raw(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        self.values.get(idx).map(String::as_str)
    }

    pub fn require(&self, column: &str) -> Result<&'a str> {
        let idx = self.table.require_column(column)?;
        Ok(self.values.get(idx).map_or("", |value| trim_cell(value)))
    }

    pub fn parse_i64(&self, column: &str) -> Result<i64> {
        let raw = self.require(column)?;
        raw.parse::<i64>().map_err(|_| self.invalid(column, raw))
    }

    pub fn parse_f64(&self, column: &str) -> Result<f64> {
        let raw = self.require(column)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(column, raw)),
        }
    }

    /// Parses an integer and negates it, rejecting values whose negation
    /// does not fit.
    pub fn parse_negated_i64(&self, column: &str) -> Result<i64> {
        let value = self.parse_i64(column)?;
        value
            .checked_neg()
            .ok_or_else(|| self.invalid(column, &value.to_string()))
    }

    fn invalid(&self, column: &str, raw: &str) -> IngestError {
        IngestError::InvalidValue {
            column: column.to_string(),
            value: raw.to_string(),
            table: self.table.name.clone(),
            row: self.index + 1,
        }
    }
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let csv_error = |source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).unwrap_or("").to_string());
        }
        rows.push(row);
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("table")
        .to_string();
    Ok(CsvTable {
        name,
        headers,
        rows,
    })
}
