//! Parameter value records and their identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Whether an entity is a single object or a relationship between objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Object,
    Relationship,
}

impl EntityCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Name of the entity a value belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityName {
    Object(String),
    /// Ordered object names, one per relationship dimension.
    Relationship(Vec<String>),
}

impl EntityName {
    pub fn category(&self) -> EntityCategory {
        match self {
            Self::Object(_) => EntityCategory::Object,
            Self::Relationship(_) => EntityCategory::Relationship,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Self::Object(_) => 1,
            Self::Relationship(names) => names.len(),
        }
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(name) => f.write_str(name),
            Self::Relationship(names) => f.write_str(&names.join(",")),
        }
    }
}

/// Identity of a stored value: everything except the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub class: String,
    pub parameter: String,
    pub entity: EntityName,
    pub alternative: String,
}

impl RecordKey {
    pub fn new(
        class: impl Into<String>,
        parameter: impl Into<String>,
        entity: EntityName,
        alternative: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            parameter: parameter.into(),
            entity,
            alternative: alternative.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.class, self.parameter, self.entity, self.alternative
        )
    }
}

/// One stored parameter value with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValueRecord {
    pub key: RecordKey,
    pub value: Value,
}

impl ParameterValueRecord {
    pub fn new(key: RecordKey, value: Value) -> Self {
        Self { key, value }
    }

    /// Convenience constructor for object parameter values.
    pub fn object(
        class: impl Into<String>,
        parameter: impl Into<String>,
        object: impl Into<String>,
        alternative: impl Into<String>,
        value: Value,
    ) -> Self {
        Self::new(
            RecordKey::new(class, parameter, EntityName::Object(object.into()), alternative),
            value,
        )
    }

    /// Convenience constructor for relationship parameter values.
    pub fn relationship<I, S>(
        class: impl Into<String>,
        parameter: impl Into<String>,
        objects: I,
        alternative: impl Into<String>,
        value: Value,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = objects.into_iter().map(Into::into).collect();
        Self::new(
            RecordKey::new(class, parameter, EntityName::Relationship(names), alternative),
            value,
        )
    }
}
