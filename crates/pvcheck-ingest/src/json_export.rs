//! Exported database documents.
//!
//! An export is a JSON object with optional `object_parameter_values` and
//! `relationship_parameter_values` lists:
//!
//! ```json
//! {
//!   "object_parameter_values": [
//!     {"class": "unit", "parameter": "cost", "object": "u1", "alternative": "Base", "value": 5.0}
//!   ],
//!   "relationship_parameter_values": [
//!     {"class": "unit__node", "parameter": "flow", "objects": ["u1", "n1"],
//!      "alternative": "Base", "value": {"type": "time_series", "data": {...}}}
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use pvcheck_model::{EntityCategory, EntityName, ParameterValueRecord, RecordKey, from_json};
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::source::RecordSource;

#[derive(Debug, Default, Deserialize)]
struct ExportDocument {
    #[serde(default)]
    object_parameter_values: Vec<Json>,
    #[serde(default)]
    relationship_parameter_values: Vec<Json>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    class: String,
    parameter: String,
    object: String,
    alternative: String,
    value: Json,
}

#[derive(Debug, Deserialize)]
struct RelationshipEntry {
    class: String,
    parameter: String,
    objects: Vec<String>,
    alternative: String,
    value: Json,
}

/// Record source reading an exported database document.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    name: String,
    path: PathBuf,
}

impl JsonExportSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonExportSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn records(&self) -> Result<Vec<ParameterValueRecord>> {
        if !self.path.exists() {
            return Err(IngestError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let text = std::fs::read_to_string(&self.path).map_err(|source| IngestError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        let records = parse_export(&text, &self.path)?;
        info!(
            source = %self.name,
            records = records.len(),
            "loaded parameter values"
        );
        Ok(records)
    }
}

/// Parse the text of an exported database; `path` is only used in errors.
pub fn parse_export(text: &str, path: &Path) -> Result<Vec<ParameterValueRecord>> {
    let document: ExportDocument =
        serde_json::from_str(text).map_err(|source| IngestError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::with_capacity(
        document.object_parameter_values.len() + document.relationship_parameter_values.len(),
    );
    for (index, entry) in document.object_parameter_values.into_iter().enumerate() {
        let entry: ObjectEntry = entry_of(entry, EntityCategory::Object, index, path)?;
        let key = RecordKey::new(
            entry.class,
            entry.parameter,
            EntityName::Object(entry.object),
            entry.alternative,
        );
        records.push(decode(key, &entry.value, path)?);
    }
    for (index, entry) in document.relationship_parameter_values.into_iter().enumerate() {
        let entry: RelationshipEntry = entry_of(entry, EntityCategory::Relationship, index, path)?;
        let key = RecordKey::new(
            entry.class,
            entry.parameter,
            EntityName::Relationship(entry.objects),
            entry.alternative,
        );
        records.push(decode(key, &entry.value, path)?);
    }
    debug!(path = %path.display(), records = records.len(), "parsed database export");
    Ok(records)
}

fn entry_of<T: for<'de> Deserialize<'de>>(
    entry: Json,
    category: EntityCategory,
    index: usize,
    path: &Path,
) -> Result<T> {
    serde_json::from_value(entry).map_err(|source| IngestError::MalformedRecord {
        path: path.to_path_buf(),
        category,
        position: index + 1,
        source,
    })
}

fn decode(key: RecordKey, value: &Json, path: &Path) -> Result<ParameterValueRecord> {
    match from_json(value) {
        Ok(value) => Ok(ParameterValueRecord::new(key, value)),
        Err(source) => Err(IngestError::Decode {
            path: path.to_path_buf(),
            record: key.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvcheck_model::Value;

    #[test]
    fn reads_both_categories() {
        let text = r#"{
            "object_parameter_values": [
                {"class": "unit", "parameter": "cost", "object": "u1", "alternative": "Base", "value": 5}
            ],
            "relationship_parameter_values": [
                {"class": "unit__node", "parameter": "flow", "objects": ["u1", "n1"],
                 "alternative": "Base", "value": {"type": "duration", "data": "1h"}}
            ]
        }"#;
        let records = parse_export(text, Path::new("db.json")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, Value::Integer(5));
        assert_eq!(records[1].key.to_string(), "unit__node - flow - u1,n1 - Base");
    }

    #[test]
    fn missing_lists_are_empty() {
        assert!(parse_export("{}", Path::new("db.json")).unwrap().is_empty());
    }

    #[test]
    fn malformed_entries_report_their_position() {
        let text = r#"{"object_parameter_values": [
            {"class": "unit", "parameter": "cost", "object": "u1", "alternative": "Base", "value": 1},
            {"class": "unit", "parameter": "cost", "alternative": "Base", "value": 1}
        ]}"#;
        let error = parse_export(text, Path::new("db.json")).unwrap_err();
        assert!(matches!(
            error,
            IngestError::MalformedRecord {
                category: EntityCategory::Object,
                position: 2,
                ..
            }
        ));
    }

    #[test]
    fn undecodable_values_name_the_record() {
        let text = r#"{"object_parameter_values": [
            {"class": "unit", "parameter": "cost", "object": "u1", "alternative": "Base",
             "value": {"type": "tensor", "data": []}}
        ]}"#;
        let error = parse_export(text, Path::new("db.json")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "failed to decode value of unit - cost - u1 - Base in db.json: unknown value type 'tensor'"
        );
    }
}
