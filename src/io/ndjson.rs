//! NDJSON (Newline Delimited JSON) and JSON array parsing for call records.
//!
//! Every record is validated after deserialization; errors carry the 1-based
//! line (NDJSON) or array index (JSON) of the offending entry.

use crate::models::{CallRecord, RecordError};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading call records.
#[derive(Error, Debug)]
pub enum RecordSourceError {
    /// I/O error when reading files
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error at line {line}: {source}")]
    JsonParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Record failed invariant validation
    #[error("Invalid record at entry {position}: {source}")]
    InvalidRecord {
        position: usize,
        #[source]
        source: RecordError,
    },

    /// Empty or invalid data
    #[error("No valid data found: {context}")]
    NoData { context: String },

    /// Generic error with context
    #[error("Error in {context}: {message}")]
    Generic { context: String, message: String },
}

impl RecordSourceError {
    /// Create a new generic error with context
    pub fn generic(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generic {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a no data error
    pub fn no_data(context: impl Into<String>) -> Self {
        Self::NoData {
            context: context.into(),
        }
    }
}

fn open(path: &Path) -> Result<File, RecordSourceError> {
    File::open(path).map_err(|e| {
        RecordSourceError::generic(
            "opening file",
            format!("Failed to open '{}': {}", path.display(), e),
        )
    })
}

/// Parse NDJSON from any reader, validating each entry.
///
/// Blank lines are skipped. An input without entries is a `NoData` error.
pub fn parse_ndjson_generic<T, R, F>(
    reader: R,
    context: &str,
    validate_entry: F,
) -> Result<Vec<T>, RecordSourceError>
where
    T: for<'de> Deserialize<'de>,
    R: BufRead,
    F: Fn(&T, usize) -> Result<(), RecordSourceError>,
{
    let mut entries = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let entry: T = serde_json::from_str(&line).map_err(|e| RecordSourceError::JsonParse {
            line: line_number + 1,
            source: e,
        })?;
        validate_entry(&entry, line_number + 1)?;
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(RecordSourceError::no_data(format!(
            "No valid entries found in {}",
            context
        )));
    }

    Ok(entries)
}

fn validate_record(record: &CallRecord, position: usize) -> Result<(), RecordSourceError> {
    record
        .validate()
        .map_err(|source| RecordSourceError::InvalidRecord { position, source })
}

/// Parse call records from an NDJSON reader.
pub fn parse_ndjson_records<R: BufRead>(
    reader: R,
    context: &str,
) -> Result<Vec<CallRecord>, RecordSourceError> {
    parse_ndjson_generic(reader, context, validate_record)
}

/// Parse an NDJSON file of call records.
pub fn parse_ndjson_file(path: impl AsRef<Path>) -> Result<Vec<CallRecord>, RecordSourceError> {
    let path = path.as_ref();
    let reader = BufReader::new(open(path)?);
    parse_ndjson_records(reader, &format!("file '{}'", path.display()))
}

/// Parse call records from a reader holding a JSON array.
pub fn parse_json_records<R: Read>(
    reader: R,
    context: &str,
) -> Result<Vec<CallRecord>, RecordSourceError> {
    let records: Vec<CallRecord> = serde_json::from_reader(reader).map_err(|e| {
        RecordSourceError::JsonParse {
            line: e.line(),
            source: e,
        }
    })?;

    for (index, record) in records.iter().enumerate() {
        validate_record(record, index + 1)?;
    }

    if records.is_empty() {
        return Err(RecordSourceError::no_data(format!(
            "Empty record array in {}",
            context
        )));
    }

    Ok(records)
}

/// Parse a JSON array file of call records.
pub fn parse_json_file(path: impl AsRef<Path>) -> Result<Vec<CallRecord>, RecordSourceError> {
    let path = path.as_ref();
    let reader = BufReader::new(open(path)?);
    parse_json_records(reader, &format!("file '{}'", path.display()))
}
