//! Canonical in-memory representation of parameter values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::duration::{Duration, DurationError};

/// A decoded parameter value.
///
/// The set of variants is closed; composite variants nest further values
/// (a [`Map`] may hold maps).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    Duration(Duration),
    Array(Array),
    TimePattern(TimePattern),
    TimeSeries(TimeSeries),
    Map(Map),
}

/// Discriminant of [`Value`], used in diagnostics and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    DateTime,
    Duration,
    Array,
    TimePattern,
    TimeSeries,
    Map,
}

impl ValueKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::Array => "array",
            Self::TimePattern => "time pattern",
            Self::TimeSeries => "time series",
            Self::Map => "map",
        }
    }

    /// True for kinds that expose an index dimension.
    pub fn is_indexed(&self) -> bool {
        matches!(
            self,
            Self::Array | Self::TimePattern | Self::TimeSeries | Self::Map
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Element type of arrays and index type of maps, as named in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Float,
    Str,
    DateTime,
    Duration,
}

impl ScalarType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            "date_time" => Some(Self::DateTime),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Str => "str",
            Self::DateTime => "date_time",
            Self::Duration => "duration",
        }
    }

    /// Whether `value` is an instance of this type. Integers count as floats.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Float, Value::Integer(_) | Value::Float(_))
                | (Self::Str, Value::String(_))
                | (Self::DateTime, Value::DateTime(_))
                | (Self::Duration, Value::Duration(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    /// Declared element type; `None` when the stored array omits it.
    pub value_type: Option<ScalarType>,
    pub elements: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePattern {
    /// Period expression and the value that applies during it.
    pub entries: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimeIndex {
    /// Stamps derived from a start and a (cycled) list of resolutions.
    Fixed {
        start: NaiveDateTime,
        resolution: Vec<Duration>,
    },
    Variable(Vec<NaiveDateTime>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub index: TimeIndex,
    pub values: Vec<f64>,
    pub ignore_year: bool,
    pub repeat: bool,
}

impl TimeSeries {
    /// Time stamps of the series, one per value for fixed resolution.
    pub fn stamps(&self) -> Result<Vec<NaiveDateTime>, DurationError> {
        match &self.index {
            TimeIndex::Variable(stamps) => Ok(stamps.clone()),
            TimeIndex::Fixed { start, resolution } => {
                if self.values.is_empty() {
                    return Ok(Vec::new());
                }
                if resolution.is_empty() {
                    return Err(DurationError::Empty);
                }
                let spans = resolution
                    .iter()
                    .map(Duration::span)
                    .collect::<Result<Vec<_>, _>>()?;
                let mut stamps = Vec::with_capacity(self.values.len());
                let mut current = *start;
                stamps.push(current);
                for step in spans.iter().cycle().take(self.values.len() - 1) {
                    current = step.add_to(current).ok_or(DurationError::OutOfRange)?;
                    stamps.push(current);
                }
                Ok(stamps)
            }
        }
    }

    pub fn is_fixed_resolution(&self) -> bool {
        matches!(self.index, TimeIndex::Fixed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub index_type: ScalarType,
    pub entries: Vec<(Value, Value)>,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Duration(_) => ValueKind::Duration,
            Value::Array(_) => ValueKind::Array,
            Value::TimePattern(_) => ValueKind::TimePattern,
            Value::TimeSeries(_) => ValueKind::TimeSeries,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.kind().is_indexed()
    }

    /// Number of nested indexing dimensions.
    ///
    /// Scalars have none, arrays, time patterns and time series one, and a
    /// map one more than the deepest of its values.
    pub fn index_count(&self) -> usize {
        match self {
            Value::Array(_) | Value::TimePattern(_) | Value::TimeSeries(_) => 1,
            Value::Map(map) => {
                1 + map
                    .entries
                    .iter()
                    .map(|(_, value)| value.index_count())
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Character count of strings, entry count of indexed values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(text) => Some(text.chars().count()),
            Value::Array(array) => Some(array.elements.len()),
            Value::TimePattern(pattern) => Some(pattern.entries.len()),
            Value::TimeSeries(series) => Some(series.values.len()),
            Value::Map(map) => Some(map.entries.len()),
            _ => None,
        }
    }

    /// Index/value pairs of an indexed value, `None` for anything else.
    ///
    /// Array indexes are positions, time series indexes are stamps. Fails
    /// when the stamps of a fixed resolution series cannot be derived.
    pub fn entries(&self) -> Option<Result<Vec<(Value, Value)>, DurationError>> {
        let entries: Vec<(Value, Value)> = match self {
            Value::Array(array) => array
                .elements
                .iter()
                .enumerate()
                .map(|(i, element)| (Value::Integer(i as i64), element.clone()))
                .collect(),
            Value::TimePattern(pattern) => pattern
                .entries
                .iter()
                .map(|(key, value)| (Value::String(key.clone()), value.clone()))
                .collect(),
            Value::TimeSeries(series) => {
                let stamps = match series.stamps() {
                    Ok(stamps) => stamps,
                    Err(error) => return Some(Err(error)),
                };
                stamps
                    .into_iter()
                    .zip(series.values.iter())
                    .map(|(stamp, value)| (Value::DateTime(stamp), Value::Float(*value)))
                    .collect()
            }
            Value::Map(map) => map.entries.clone(),
            _ => return None,
        };
        Some(Ok(entries))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => f.write_str(if *value { "true" } else { "false" }),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => f.write_str(&format_float(*value)),
            Value::String(text) => f.write_str(text),
            Value::DateTime(stamp) => write!(f, "{}", stamp.format(DATETIME_FORMAT)),
            Value::Duration(duration) => write!(f, "{duration}"),
            other => write!(
                f,
                "{} of length {}",
                other.kind(),
                other.len().unwrap_or_default()
            ),
        }
    }
}

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format a float so integral values keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Parse an ISO 8601 date or date-time without offset.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;

    fn series(values: Vec<f64>) -> Value {
        Value::TimeSeries(TimeSeries {
            index: TimeIndex::Fixed {
                start: parse_datetime("2020-01-01T00:00:00").unwrap(),
                resolution: vec![Duration::new("1h")],
            },
            values,
            ignore_year: false,
            repeat: false,
        })
    }

    fn map_of(values: Vec<Value>) -> Value {
        Value::Map(Map {
            index_type: ScalarType::Str,
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Value::String(format!("k{i}")), value))
                .collect(),
        })
    }

    #[test]
    fn index_count_of_scalars_is_zero() {
        assert_eq!(Value::Float(2.5).index_count(), 0);
        assert_eq!(Value::Duration(Duration::new("1D")).index_count(), 0);
    }

    #[test]
    fn index_count_nests_through_maps() {
        assert_eq!(series(vec![1.0]).index_count(), 1);
        assert_eq!(map_of(vec![series(vec![1.0])]).index_count(), 2);
        assert_eq!(
            map_of(vec![Value::Float(1.0), map_of(vec![series(vec![1.0])])]).index_count(),
            3
        );
        assert_eq!(map_of(Vec::new()).index_count(), 1);
    }

    #[test]
    fn fixed_resolution_stamps_cycle_resolutions() {
        let value = Value::TimeSeries(TimeSeries {
            index: TimeIndex::Fixed {
                start: parse_datetime("2020-01-01").unwrap(),
                resolution: vec![Duration::new("1h"), Duration::new("2h")],
            },
            values: vec![1.0, 2.0, 3.0, 4.0],
            ignore_year: false,
            repeat: false,
        });
        let Value::TimeSeries(series) = value else {
            unreachable!()
        };
        let stamps = series.stamps().unwrap();
        let hours: Vec<String> = stamps
            .iter()
            .map(|s| s.format("%H").to_string())
            .collect();
        assert_eq!(hours, ["00", "01", "03", "04"]);
    }

    #[test]
    fn entries_fail_when_stamps_cannot_be_derived() {
        let value = Value::TimeSeries(TimeSeries {
            index: TimeIndex::Fixed {
                start: parse_datetime("2020-01-01").unwrap(),
                resolution: vec![Duration::new("1 fortnight")],
            },
            values: vec![5.0, 6.0],
            ignore_year: false,
            repeat: false,
        });
        assert!(matches!(value.entries(), Some(Err(_))));
        assert_eq!(series(vec![5.0, 6.0]).entries().unwrap().unwrap().len(), 2);
        assert!(Value::Float(1.0).entries().is_none());
    }

    #[test]
    fn displays_floats_like_stored_numbers() {
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(series(vec![1.0, 2.0]).to_string(), "time series of length 2");
    }

    #[test]
    fn parses_dates_and_date_times() {
        assert!(parse_datetime("2020-01-01").is_some());
        assert!(parse_datetime("2020-01-01T12:30").is_some());
        assert!(parse_datetime("2020-01-01 12:30:15.5").is_some());
        assert!(parse_datetime("01/01/2020").is_none());
    }
}
