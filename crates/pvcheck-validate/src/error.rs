#![deny(unsafe_code)]

use std::path::PathBuf;

use crate::rule::RuleId;

/// Fatal configuration problems, raised while loading settings and never
/// during record evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected settings to contain a JSON object")]
    NotAnObject,

    #[error("expected \"{key}\" to contain a list")]
    NotAList { key: &'static str },

    #[error("{rule}: {source}")]
    Rule {
        rule: RuleId,
        #[source]
        source: RuleError,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Problem with a single rule object.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("expected rule to be a JSON object")]
    NotAnObject,

    #[error("malformed rule: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("\"{field}\" is not allowed in {category} rules")]
    FieldNotAllowed {
        field: &'static str,
        category: &'static str,
    },

    #[error("invalid \"{field}\" pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("declares {declared} dimensions but has {patterns} object patterns")]
    DimensionMismatch { declared: usize, patterns: usize },

    #[error("invalid \"rule\": {0}")]
    Schema(#[from] SchemaError),
}

/// Problem with a validation schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("schema must be a JSON object")]
    NotAnObject,

    #[error("unknown constraint '{0}'")]
    UnknownConstraint(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("invalid argument for '{key}': {message}")]
    InvalidArgument { key: &'static str, message: String },

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("in '{key}': {source}")]
    Nested {
        key: &'static str,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    pub(crate) fn argument(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            key,
            message: message.into(),
        }
    }
}

/// Failure to export a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
