//! Decoding of the database value encoding.
//!
//! Plain JSON scalars are plain values. Extended types are JSON objects
//! carrying a `"type"` tag:
//!
//! ```json
//! {"type": "date_time", "data": "2020-01-01T00:00:00"}
//! {"type": "duration", "data": "5D"}
//! {"type": "array", "value_type": "float", "data": [1.0, 2.0]}
//! {"type": "time_pattern", "data": {"M1-4,M9-12": 300, "M5-8": 221.5}}
//! {"type": "time_series", "data": {"2020-01-01T00:00:00": 1.0, "2020-01-01T01:00:00": 2.0}}
//! {"type": "time_series", "index": {"start": "2020-01-01", "resolution": "1h"}, "data": [1.0, 2.0]}
//! {"type": "map", "index_type": "str", "data": [["a", 1.0], ["b", {"type": "map", ...}]]}
//! ```

use serde_json::{Map as JsonMap, Value as Json};

use crate::duration::Duration;
use crate::error::{DecodeError, Result};
use crate::value::{
    Array, Map, ScalarType, TimeIndex, TimePattern, TimeSeries, Value, parse_datetime,
};

const DEFAULT_START: &str = "0001-01-01T00:00:00";
const DEFAULT_RESOLUTION: &str = "1h";

/// Decode a stored value.
pub fn from_json(json: &Json) -> Result<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(value) => Ok(Value::Bool(*value)),
        Json::Number(number) => Ok(match number.as_i64() {
            Some(value) => Value::Integer(value),
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(text) => Ok(Value::String(text.clone())),
        Json::Array(_) => Err(DecodeError::UnknownType("untagged list".to_string())),
        Json::Object(object) => decode_tagged(object),
    }
}

fn decode_tagged(object: &JsonMap<String, Json>) -> Result<Value> {
    let tag = object
        .get("type")
        .and_then(Json::as_str)
        .ok_or(DecodeError::MissingField {
            value_type: "tagged",
            field: "type",
        })?;
    match tag {
        "date_time" => {
            let text = data_str(object, "date_time")?;
            parse_datetime(text)
                .map(Value::DateTime)
                .ok_or_else(|| DecodeError::DateTime(text.to_string()))
        }
        "duration" => Ok(Value::Duration(Duration::new(data_str(object, "duration")?))),
        "array" => decode_array(object).map(Value::Array),
        "time_pattern" => decode_time_pattern(object).map(Value::TimePattern),
        "time_series" => decode_time_series(object).map(Value::TimeSeries),
        "map" => decode_map(object).map(Value::Map),
        other => Err(DecodeError::UnknownType(other.to_string())),
    }
}

fn data<'a>(object: &'a JsonMap<String, Json>, value_type: &'static str) -> Result<&'a Json> {
    object.get("data").ok_or(DecodeError::MissingField {
        value_type,
        field: "data",
    })
}

fn data_str<'a>(object: &'a JsonMap<String, Json>, value_type: &'static str) -> Result<&'a str> {
    data(object, value_type)?
        .as_str()
        .ok_or_else(|| DecodeError::invalid(value_type, "data must be a string"))
}

fn scalar_type(object: &JsonMap<String, Json>, field: &str) -> Result<Option<ScalarType>> {
    match object.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(name)) => ScalarType::parse(name)
            .map(Some)
            .ok_or_else(|| DecodeError::UnknownIndexType(name.clone())),
        Some(other) => Err(DecodeError::UnknownIndexType(other.to_string())),
    }
}

/// Decode a scalar and coerce date-time and duration text to the declared type.
///
/// Text that does not fit is kept as a string so validation can report it.
fn decode_typed(json: &Json, declared: Option<ScalarType>) -> Result<Value> {
    let value = from_json(json)?;
    Ok(match (declared, value) {
        (Some(ScalarType::DateTime), Value::String(text)) => match parse_datetime(&text) {
            Some(stamp) => Value::DateTime(stamp),
            None => Value::String(text),
        },
        (Some(ScalarType::Duration), Value::String(text)) => Value::Duration(Duration::new(text)),
        (_, value) => value,
    })
}

fn decode_array(object: &JsonMap<String, Json>) -> Result<Array> {
    let value_type = scalar_type(object, "value_type")?;
    let items = data(object, "array")?
        .as_array()
        .ok_or_else(|| DecodeError::invalid("array", "data must be a list"))?;
    let elements = items
        .iter()
        .map(|item| decode_typed(item, value_type))
        .collect::<Result<Vec<_>>>()?;
    Ok(Array {
        value_type,
        elements,
    })
}

fn decode_time_pattern(object: &JsonMap<String, Json>) -> Result<TimePattern> {
    let items = data(object, "time_pattern")?
        .as_object()
        .ok_or_else(|| DecodeError::invalid("time_pattern", "data must be an object"))?;
    let entries = items
        .iter()
        .map(|(key, value)| Ok((key.clone(), from_json(value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(TimePattern { entries })
}

fn series_value(json: &Json) -> Result<f64> {
    match json {
        Json::Null => Ok(f64::NAN),
        Json::Number(number) => number
            .as_f64()
            .ok_or_else(|| DecodeError::invalid("time_series", "value out of range")),
        other => Err(DecodeError::invalid(
            "time_series",
            format!("value {other} is not a number"),
        )),
    }
}

fn stamp(text: &str) -> Result<chrono::NaiveDateTime> {
    parse_datetime(text).ok_or_else(|| DecodeError::DateTime(text.to_string()))
}

fn decode_time_series(object: &JsonMap<String, Json>) -> Result<TimeSeries> {
    let index = object.get("index").and_then(Json::as_object);
    let flag = |name: &str| {
        index
            .and_then(|index| index.get(name))
            .and_then(Json::as_bool)
            .unwrap_or(false)
    };
    let ignore_year = flag("ignore_year");
    let repeat = flag("repeat");
    let (index, values) = match data(object, "time_series")? {
        Json::Object(items) => {
            let mut stamps = Vec::with_capacity(items.len());
            let mut values = Vec::with_capacity(items.len());
            for (key, value) in items {
                stamps.push(stamp(key)?);
                values.push(series_value(value)?);
            }
            (TimeIndex::Variable(stamps), values)
        }
        Json::Array(items) if items.iter().all(Json::is_array) => {
            let mut stamps = Vec::with_capacity(items.len());
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                let pair = item.as_array().map(Vec::as_slice).unwrap_or_default();
                let [key, value] = pair else {
                    return Err(DecodeError::invalid(
                        "time_series",
                        "entries must be [stamp, value] pairs",
                    ));
                };
                let key = key
                    .as_str()
                    .ok_or_else(|| DecodeError::invalid("time_series", "stamp must be a string"))?;
                stamps.push(stamp(key)?);
                values.push(series_value(value)?);
            }
            (TimeIndex::Variable(stamps), values)
        }
        Json::Array(items) => {
            let values = items.iter().map(series_value).collect::<Result<Vec<_>>>()?;
            (fixed_index(index)?, values)
        }
        _ => {
            return Err(DecodeError::invalid(
                "time_series",
                "data must be an object or a list",
            ));
        }
    };
    Ok(TimeSeries {
        index,
        values,
        ignore_year,
        repeat,
    })
}

fn fixed_index(index: Option<&JsonMap<String, Json>>) -> Result<TimeIndex> {
    let start_text = index
        .and_then(|index| index.get("start"))
        .and_then(Json::as_str)
        .unwrap_or(DEFAULT_START);
    let resolution = match index.and_then(|index| index.get("resolution")) {
        None => vec![Duration::new(DEFAULT_RESOLUTION)],
        Some(Json::String(text)) => vec![Duration::new(text.as_str())],
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(Duration::new).ok_or_else(|| {
                    DecodeError::invalid("time_series", "resolution must be a string")
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(DecodeError::invalid(
                "time_series",
                format!("invalid resolution {other}"),
            ));
        }
    };
    Ok(TimeIndex::Fixed {
        start: stamp(start_text)?,
        resolution,
    })
}

fn decode_map(object: &JsonMap<String, Json>) -> Result<Map> {
    let declared = scalar_type(object, "index_type")?;
    let entries = match data(object, "map")? {
        Json::Object(items) => {
            let index_type = declared.unwrap_or(ScalarType::Str);
            let entries = items
                .iter()
                .map(|(key, value)| {
                    Ok((map_key(&Json::String(key.clone()), index_type)?, from_json(value)?))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Map {
                index_type,
                entries,
            });
        }
        Json::Array(items) => items,
        _ => return Err(DecodeError::invalid("map", "data must be an object or a list")),
    };
    let index_type = declared.ok_or(DecodeError::MissingField {
        value_type: "map",
        field: "index_type",
    })?;
    let entries = entries
        .iter()
        .map(|item| {
            let pair = item.as_array().map(Vec::as_slice).unwrap_or_default();
            let [key, value] = pair else {
                return Err(DecodeError::invalid("map", "entries must be [index, value] pairs"));
            };
            Ok((map_key(key, index_type)?, from_json(value)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Map {
        index_type,
        entries,
    })
}

fn map_key(json: &Json, index_type: ScalarType) -> Result<Value> {
    match (index_type, json) {
        (ScalarType::Float, Json::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| DecodeError::invalid("map", format!("index '{text}' is not a number"))),
        (ScalarType::Float, Json::Number(_)) => from_json(json),
        (ScalarType::Str, Json::String(text)) => Ok(Value::String(text.clone())),
        (ScalarType::DateTime, Json::String(text)) => stamp(text).map(Value::DateTime),
        (ScalarType::Duration, Json::String(text)) => {
            Ok(Value::Duration(Duration::new(text.as_str())))
        }
        (index_type, other) => Err(DecodeError::invalid(
            "map",
            format!("index {other} does not match index type {}", index_type.name()),
        )),
    }
}
