//! Record source boundary and database URL resolution.

use std::path::PathBuf;

use pvcheck_model::ParameterValueRecord;

use crate::error::{IngestError, Result};
use crate::json_export::JsonExportSource;

/// Provides the fully materialised parameter value records of one database.
pub trait RecordSource {
    /// Human-readable origin, used in logs and reports.
    fn name(&self) -> &str;

    fn records(&self) -> Result<Vec<ParameterValueRecord>>;
}

/// Where a database URL points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Exported database document on the local file system.
    JsonFile(PathBuf),
}

impl DatabaseLocation {
    /// Resolve `url`: `file://` and `json://` URLs and plain paths name an
    /// exported database document; any other scheme is rejected.
    pub fn parse(url: &str) -> Result<Self> {
        match url.split_once("://") {
            Some(("file" | "json", path)) => Ok(Self::JsonFile(PathBuf::from(path))),
            Some((scheme, _)) if is_scheme(scheme) => Err(IngestError::UnsupportedScheme {
                url: url.to_string(),
                scheme: scheme.to_string(),
            }),
            _ => Ok(Self::JsonFile(PathBuf::from(url))),
        }
    }
}

fn is_scheme(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Open the record source behind a database URL.
pub fn open_source(url: &str) -> Result<Box<dyn RecordSource>> {
    match DatabaseLocation::parse(url)? {
        DatabaseLocation::JsonFile(path) => Ok(Box::new(JsonExportSource::new(url, path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_json_urls_resolve_to_paths() {
        assert_eq!(
            DatabaseLocation::parse("file:///data/db.json").unwrap(),
            DatabaseLocation::JsonFile(PathBuf::from("/data/db.json"))
        );
        assert_eq!(
            DatabaseLocation::parse("json://export.json").unwrap(),
            DatabaseLocation::JsonFile(PathBuf::from("export.json"))
        );
        assert_eq!(
            DatabaseLocation::parse("relative/db.json").unwrap(),
            DatabaseLocation::JsonFile(PathBuf::from("relative/db.json"))
        );
    }

    #[test]
    fn database_schemes_are_rejected() {
        let error = DatabaseLocation::parse("sqlite:///data/db.sqlite").unwrap_err();
        assert!(matches!(
            error,
            IngestError::UnsupportedScheme { ref scheme, .. } if scheme == "sqlite"
        ));
        assert!(DatabaseLocation::parse("postgresql+psycopg://host/db").is_err());
    }
}
