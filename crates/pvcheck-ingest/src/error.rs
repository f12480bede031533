//! Error types for record sources.

use std::path::PathBuf;

use pvcheck_model::{DecodeError, EntityCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// URL scheme with no record source behind it.
    #[error("unsupported database URL '{url}': no record source for scheme '{scheme}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("database file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read database file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse database file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record entry does not have the expected fields.
    #[error("malformed {category} parameter value #{position} in {path}: {source}")]
    MalformedRecord {
        path: PathBuf,
        category: EntityCategory,
        position: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode value of {record} in {path}: {source}")]
    Decode {
        path: PathBuf,
        record: String,
        #[source]
        source: DecodeError,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
