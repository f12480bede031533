//! Parameter value model.
//!
//! Values are decoded once from their stored encoding ([`codec::from_json`])
//! into the closed [`Value`] union and then only read.

pub mod codec;
pub mod duration;
pub mod error;
pub mod record;
pub mod time_pattern;
pub mod value;

pub use codec::from_json;
pub use duration::{Duration, DurationError, DurationSpan, DurationUnit};
pub use error::{DecodeError, Result};
pub use record::{EntityCategory, EntityName, ParameterValueRecord, RecordKey};
pub use time_pattern::{PeriodRange, PeriodUnit, TimePatternError, TimePatternExpr};
pub use value::{
    Array, Map, ScalarType, TimeIndex, TimePattern, TimeSeries, Value, ValueKind, format_float,
    parse_datetime,
};
