//! Validation schemas.
//!
//! A schema is written in the settings file as a JSON object mapping
//! constraint keys to arguments:
//!
//! ```json
//! {"type": "map", "number of indexes": 2, "valuesrules": {"type": "time series"}}
//! ```
//!
//! [`Schema::compile`] turns it into a typed structure once, at load time,
//! so unknown keys, unknown type names and malformed arguments never reach
//! record evaluation.

use std::fmt;

use chrono::NaiveDateTime;
use pvcheck_model::{Value, parse_datetime};
use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::error::SchemaError;
use crate::pattern::Pattern;

/// Type names accepted by the `type` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Boolean,
    Integer,
    Float,
    Number,
    String,
    DateTime,
    Array,
    Duration,
    Map,
    TimePattern,
    TimeSeries,
}

impl TypeName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "datetime" | "date_time" => Some(Self::DateTime),
            "array" => Some(Self::Array),
            "duration" => Some(Self::Duration),
            "map" => Some(Self::Map),
            "time pattern" | "time_pattern" => Some(Self::TimePattern),
            "time series" | "time_series" => Some(Self::TimeSeries),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::Array => "array",
            Self::Duration => "duration",
            Self::Map => "map",
            Self::TimePattern => "time pattern",
            Self::TimeSeries => "time series",
        }
    }

    /// `number` covers integers and floats; `float` accepts integers too.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Boolean, Value::Bool(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::Float | Self::Number, Value::Integer(_) | Value::Float(_))
                | (Self::String, Value::String(_))
                | (Self::DateTime, Value::DateTime(_))
                | (Self::Array, Value::Array(_))
                | (Self::Duration, Value::Duration(_))
                | (Self::Map, Value::Map(_))
                | (Self::TimePattern, Value::TimePattern(_))
                | (Self::TimeSeries, Value::TimeSeries(_))
        )
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Argument of `min` / `max`.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Number(Number),
    DateTime(NaiveDateTime, String),
    Text(String),
}

impl Bound {
    fn from_json(key: &'static str, json: &Json) -> Result<Self, SchemaError> {
        match json {
            Json::Number(number) => Ok(Self::Number(number.clone())),
            Json::String(text) => Ok(match parse_datetime(text) {
                Some(stamp) => Self::DateTime(stamp, text.clone()),
                None => Self::Text(text.clone()),
            }),
            other => Err(SchemaError::argument(
                key,
                format!("expected a number or a string, got {other}"),
            )),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::DateTime(_, text) | Self::Text(text) => f.write_str(text),
        }
    }
}

/// A compiled validation schema.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Accepted types; empty when the schema has no `type` constraint.
    pub types: Vec<TypeName>,
    pub nullable: bool,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub allowed: Option<Vec<Json>>,
    pub forbidden: Option<Vec<Json>>,
    pub regex: Option<Pattern>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub empty: bool,
    pub min_indexes: Option<usize>,
    pub max_indexes: Option<usize>,
    pub number_of_indexes: Option<usize>,
    pub keys: Option<Box<Schema>>,
    pub values: Option<Box<Schema>>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            nullable: false,
            min: None,
            max: None,
            allowed: None,
            forbidden: None,
            regex: None,
            min_length: None,
            max_length: None,
            empty: true,
            min_indexes: None,
            max_indexes: None,
            number_of_indexes: None,
            keys: None,
            values: None,
        }
    }
}

impl Schema {
    pub fn from_json(json: &Json) -> Result<Self, SchemaError> {
        match json {
            Json::Object(object) => Self::compile(object),
            _ => Err(SchemaError::NotAnObject),
        }
    }

    pub fn compile(object: &JsonMap<String, Json>) -> Result<Self, SchemaError> {
        let mut schema = Schema::default();
        for (key, argument) in object {
            match key.as_str() {
                "type" => schema.types = type_names(argument)?,
                "nullable" => schema.nullable = boolean("nullable", argument)?,
                "empty" => schema.empty = boolean("empty", argument)?,
                "min" => schema.min = Some(Bound::from_json("min", argument)?),
                "max" => schema.max = Some(Bound::from_json("max", argument)?),
                "allowed" => schema.allowed = Some(scalar_list("allowed", argument)?),
                "forbidden" => schema.forbidden = Some(scalar_list("forbidden", argument)?),
                "regex" => schema.regex = Some(regex(argument)?),
                "minlength" => schema.min_length = Some(count("minlength", argument)?),
                "maxlength" => schema.max_length = Some(count("maxlength", argument)?),
                "min indexes" => schema.min_indexes = Some(count("min indexes", argument)?),
                "max indexes" => schema.max_indexes = Some(count("max indexes", argument)?),
                "number of indexes" => {
                    schema.number_of_indexes = Some(count("number of indexes", argument)?)
                }
                "keysrules" => schema.keys = Some(Box::new(nested("keysrules", argument)?)),
                "valuesrules" => schema.values = Some(Box::new(nested("valuesrules", argument)?)),
                other => return Err(SchemaError::UnknownConstraint(other.to_string())),
            }
        }
        Ok(schema)
    }

    /// Whether the schema names the value's own type, unlocking the
    /// structural checks of that type.
    pub fn declares_type_of(&self, value: &Value) -> bool {
        self.types.iter().any(|name| name.accepts(value))
    }
}

fn type_names(argument: &Json) -> Result<Vec<TypeName>, SchemaError> {
    let names: Vec<&Json> = match argument {
        Json::Array(items) => items.iter().collect(),
        single => vec![single],
    };
    if names.is_empty() {
        return Err(SchemaError::argument("type", "expected at least one type"));
    }
    names
        .into_iter()
        .map(|name| {
            let text = name
                .as_str()
                .ok_or_else(|| SchemaError::argument("type", format!("expected a type name, got {name}")))?;
            TypeName::parse(text).ok_or_else(|| SchemaError::UnknownType(text.to_string()))
        })
        .collect()
}

fn boolean(key: &'static str, argument: &Json) -> Result<bool, SchemaError> {
    argument
        .as_bool()
        .ok_or_else(|| SchemaError::argument(key, format!("expected a boolean, got {argument}")))
}

fn count(key: &'static str, argument: &Json) -> Result<usize, SchemaError> {
    argument
        .as_u64()
        .and_then(|value| usize::try_from(value).ok())
        .ok_or_else(|| {
            SchemaError::argument(key, format!("expected a non-negative integer, got {argument}"))
        })
}

fn scalar_list(key: &'static str, argument: &Json) -> Result<Vec<Json>, SchemaError> {
    let items = argument
        .as_array()
        .ok_or_else(|| SchemaError::argument(key, format!("expected a list, got {argument}")))?;
    if let Some(item) = items.iter().find(|item| item.is_array() || item.is_object()) {
        return Err(SchemaError::argument(
            key,
            format!("expected scalar entries, got {item}"),
        ));
    }
    Ok(items.clone())
}

fn regex(argument: &Json) -> Result<Pattern, SchemaError> {
    let source = argument
        .as_str()
        .ok_or_else(|| SchemaError::argument("regex", format!("expected a string, got {argument}")))?;
    Pattern::new(source).map_err(|source_error| SchemaError::InvalidRegex {
        pattern: source.to_string(),
        source: source_error,
    })
}

fn nested(key: &'static str, argument: &Json) -> Result<Schema, SchemaError> {
    Schema::from_json(argument).map_err(|source| SchemaError::Nested {
        key,
        source: Box::new(source),
    })
}
