//! Schema validation of decoded values.
//!
//! [`validate`] checks every constraint of a schema and returns all
//! violations it finds. Only a null value short-circuits: it is either
//! allowed by `nullable` or reported once, and no other constraint applies
//! to it.

use std::cmp::Ordering;

use pvcheck_model::{
    Array, Duration, Map, TimeIndex, TimePattern, TimePatternExpr, TimeSeries, Value, ValueKind,
};
use serde_json::Value as Json;

use crate::schema::{Bound, Schema};
use crate::violation::{Location, Segment, Violation, ViolationKind};

/// Validate `value` against `schema`; an empty result means the value is
/// valid.
pub fn validate(value: &Value, schema: &Schema) -> Vec<Violation> {
    let mut violations = Vec::new();
    check(value, schema, &Location::root(), &mut violations);
    violations
}

fn check(value: &Value, schema: &Schema, location: &Location, out: &mut Vec<Violation>) {
    let mut report = |kind| out.push(Violation::new(location.clone(), kind));

    if matches!(value, Value::Null) {
        if !schema.nullable {
            report(ViolationKind::NullNotAllowed);
        }
        return;
    }

    if !schema.types.is_empty() && !schema.declares_type_of(value) {
        report(ViolationKind::TypeMismatch {
            expected: schema.types.iter().map(|t| t.label().to_string()).collect(),
            actual: value.kind(),
        });
    }

    if let Some(min) = &schema.min
        && compare(value, min) == Some(Ordering::Less)
    {
        report(ViolationKind::BelowMin {
            min: min.to_string(),
            actual: value.to_string(),
        });
    }
    if let Some(max) = &schema.max
        && compare(value, max) == Some(Ordering::Greater)
    {
        report(ViolationKind::AboveMax {
            max: max.to_string(),
            actual: value.to_string(),
        });
    }

    if is_scalar(value) {
        if let Some(allowed) = &schema.allowed
            && !allowed.iter().any(|candidate| equals(value, candidate))
        {
            report(ViolationKind::NotAllowed {
                value: value.to_string(),
            });
        }
        if let Some(forbidden) = &schema.forbidden
            && forbidden.iter().any(|candidate| equals(value, candidate))
        {
            report(ViolationKind::Forbidden {
                value: value.to_string(),
            });
        }
    }

    if let (Some(pattern), Value::String(text)) = (&schema.regex, value)
        && !pattern.matches(text)
    {
        report(ViolationKind::RegexMismatch {
            pattern: pattern.as_str().to_string(),
            value: text.clone(),
        });
    }

    if let Some(length) = value.len() {
        if let Some(min_length) = schema.min_length
            && length < min_length
        {
            report(ViolationKind::TooShort {
                min_length,
                actual: length,
            });
        }
        if let Some(max_length) = schema.max_length
            && length > max_length
        {
            report(ViolationKind::TooLong {
                max_length,
                actual: length,
            });
        }
        if !schema.empty && length == 0 {
            report(ViolationKind::EmptyNotAllowed);
        }
    }

    let index_count = value.index_count();
    if let Some(min) = schema.min_indexes
        && index_count < min
    {
        report(ViolationKind::TooFewIndexes {
            min,
            actual: index_count,
        });
    }
    if let Some(max) = schema.max_indexes
        && index_count > max
    {
        report(ViolationKind::TooManyIndexes {
            max,
            actual: index_count,
        });
    }
    if let Some(expected) = schema.number_of_indexes
        && index_count != expected
    {
        report(ViolationKind::IndexCountMismatch {
            expected,
            actual: index_count,
        });
    }

    if schema.declares_type_of(value) {
        check_structure(value, location, out);
    }

    if schema.keys.is_none() && schema.values.is_none() {
        return;
    }
    match value.entries() {
        Some(Ok(entries)) => {
            for (index, item) in entries {
                let label = index.to_string();
                if let Some(keys) = &schema.keys {
                    check(&index, keys, &location.child(Segment::Index(label.clone())), out);
                }
                if let Some(values) = &schema.values {
                    check(&item, values, &location.child(Segment::Value(label)), out);
                }
            }
        }
        // Already reported by the structural checks when the type is declared.
        Some(Err(error)) if !schema.declares_type_of(value) => {
            out.push(Violation::new(
                location.clone(),
                ViolationKind::InvalidResolution {
                    reason: error.to_string(),
                },
            ));
        }
        Some(Err(_)) | None => {}
    }
}

/// Structural checks of the extended types.
fn check_structure(value: &Value, location: &Location, out: &mut Vec<Violation>) {
    match value {
        Value::Duration(duration) => check_duration(duration, location, out),
        Value::Array(array) => check_array(array, location, out),
        Value::TimePattern(pattern) => check_time_pattern(pattern, location, out),
        Value::TimeSeries(series) => check_time_series(series, location, out),
        Value::Map(map) => check_map(map, location, out),
        _ => {}
    }
}

fn check_duration(duration: &Duration, location: &Location, out: &mut Vec<Violation>) {
    let kind = match duration.span() {
        Ok(span) if span.is_negative() => ViolationKind::NegativeDuration {
            text: duration.as_str().to_string(),
        },
        Ok(_) => return,
        Err(error) => ViolationKind::InvalidDuration {
            text: duration.as_str().to_string(),
            reason: error.to_string(),
        },
    };
    out.push(Violation::new(location.clone(), kind));
}

fn check_array(array: &Array, location: &Location, out: &mut Vec<Violation>) {
    let expected = array
        .value_type
        .map(|value_type| value_type.name().to_string())
        .or_else(|| array.elements.first().map(|first| scalar_group(first.kind()).to_string()));

    for (position, element) in array.elements.iter().enumerate() {
        let location = location.child(Segment::Value(position.to_string()));
        if !is_scalar(element) {
            out.push(Violation::new(
                location,
                ViolationKind::ElementNotScalar {
                    actual: element.kind(),
                },
            ));
            continue;
        }
        let consistent = match array.value_type {
            Some(value_type) => value_type.accepts(element),
            None => array
                .elements
                .first()
                .is_none_or(|first| scalar_group(first.kind()) == scalar_group(element.kind())),
        };
        if !consistent {
            out.push(Violation::new(
                location,
                ViolationKind::ElementTypeMismatch {
                    expected: expected.clone().unwrap_or_default(),
                    actual: element.kind(),
                },
            ));
            continue;
        }
        if let Value::Duration(duration) = element {
            check_duration(duration, &location, out);
        }
    }
}

fn check_time_pattern(pattern: &TimePattern, location: &Location, out: &mut Vec<Violation>) {
    for (expression, value) in &pattern.entries {
        if let Err(error) = expression.parse::<TimePatternExpr>() {
            out.push(Violation::new(
                location.child(Segment::Index(expression.clone())),
                ViolationKind::InvalidTimePattern {
                    expression: expression.clone(),
                    reason: error.to_string(),
                },
            ));
        }
        if value.as_f64().is_none() {
            out.push(Violation::new(
                location.child(Segment::Value(expression.clone())),
                ViolationKind::NonNumericValue {
                    actual: value.kind(),
                },
            ));
        }
    }
}

fn check_time_series(series: &TimeSeries, location: &Location, out: &mut Vec<Violation>) {
    match &series.index {
        TimeIndex::Fixed { resolution, .. } => {
            if resolution.is_empty() {
                out.push(Violation::new(
                    location.clone(),
                    ViolationKind::InvalidResolution {
                        reason: "no resolution given".to_string(),
                    },
                ));
                return;
            }
            let mut valid = true;
            for step in resolution {
                let reason = match step.span() {
                    Ok(span) if span.magnitude > 0 => continue,
                    Ok(_) => format!("resolution '{step}' must be positive"),
                    Err(error) => error.to_string(),
                };
                valid = false;
                out.push(Violation::new(
                    location.clone(),
                    ViolationKind::InvalidResolution { reason },
                ));
            }
            if valid && let Err(error) = series.stamps() {
                out.push(Violation::new(
                    location.clone(),
                    ViolationKind::InvalidResolution {
                        reason: error.to_string(),
                    },
                ));
            }
        }
        TimeIndex::Variable(stamps) => {
            if stamps.len() != series.values.len() {
                out.push(Violation::new(
                    location.clone(),
                    ViolationKind::LengthMismatch {
                        stamps: stamps.len(),
                        values: series.values.len(),
                    },
                ));
            }
            for pair in stamps.windows(2) {
                let (previous, current) = (Value::DateTime(pair[0]), Value::DateTime(pair[1]));
                if pair[1] <= pair[0] {
                    out.push(Violation::new(
                        location.child(Segment::Index(current.to_string())),
                        ViolationKind::OrderingViolation {
                            previous: previous.to_string(),
                            current: current.to_string(),
                        },
                    ));
                }
            }
        }
    }
}

fn check_map(map: &Map, location: &Location, out: &mut Vec<Violation>) {
    for (index, value) in &map.entries {
        let label = index.to_string();
        if !map.index_type.accepts(index) {
            out.push(Violation::new(
                location.child(Segment::Index(label.clone())),
                ViolationKind::ElementTypeMismatch {
                    expected: map.index_type.name().to_string(),
                    actual: index.kind(),
                },
            ));
        } else if let Value::Duration(duration) = index {
            check_duration(duration, &location.child(Segment::Index(label.clone())), out);
        }
        check_structure(value, &location.child(Segment::Value(label)), out);
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(_)
            | Value::Integer(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::DateTime(_)
            | Value::Duration(_)
    )
}

/// Integers and floats mix freely inside one array.
fn scalar_group(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer | ValueKind::Float => "float",
        other => other.label(),
    }
}

fn compare(value: &Value, bound: &Bound) -> Option<Ordering> {
    match (value, bound) {
        (Value::Integer(actual), Bound::Number(limit)) => match limit.as_i64() {
            Some(limit) => Some(actual.cmp(&limit)),
            None => (*actual as f64).partial_cmp(&limit.as_f64()?),
        },
        (Value::Float(actual), Bound::Number(limit)) => actual.partial_cmp(&limit.as_f64()?),
        (Value::DateTime(actual), Bound::DateTime(limit, _)) => Some(actual.cmp(limit)),
        (Value::String(actual), Bound::Text(limit) | Bound::DateTime(_, limit)) => {
            Some(actual.as_str().cmp(limit.as_str()))
        }
        _ => None,
    }
}

fn equals(value: &Value, candidate: &Json) -> bool {
    match (value, candidate) {
        (Value::Bool(actual), Json::Bool(expected)) => actual == expected,
        (Value::Integer(actual), Json::Number(expected)) => match expected.as_i64() {
            Some(expected) => *actual == expected,
            None => expected.as_f64() == Some(*actual as f64),
        },
        (Value::Float(actual), Json::Number(expected)) => expected.as_f64() == Some(*actual),
        (Value::String(actual), Json::String(expected)) => actual == expected,
        (Value::DateTime(actual), Json::String(expected)) => {
            pvcheck_model::parse_datetime(expected) == Some(*actual)
        }
        (Value::Duration(actual), Json::String(expected)) => actual.as_str() == expected,
        _ => false,
    }
}
