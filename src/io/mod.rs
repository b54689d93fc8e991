//! I/O utilities for loading call records.
//!
//! Records come from NDJSON files, JSON array files, or memory.

pub mod ndjson;
pub mod record_source;

// Re-export commonly used types and functions
pub use ndjson::{parse_json_file, parse_ndjson_file, RecordSourceError};
pub use record_source::{InMemorySource, JsonFileSource, NdjsonFileSource, RecordSource};
