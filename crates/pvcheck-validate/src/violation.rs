//! Constraint violations.
//!
//! Each [`ViolationKind`] variant carries only the data its diagnostic
//! needs; messages follow the wording users already see from the
//! rule-based validator (`max value is 0.0`, `must be of integer type`).

use std::fmt;

use pvcheck_model::ValueKind;
use serde::{Serialize, Serializer};

/// Step from a value into one of its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// The value stored at an index.
    Value(String),
    /// The index itself.
    Index(String),
}

/// Position of a violation inside a composite value; empty for the value
/// itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(Vec<Segment>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                Segment::Value(index) => write!(f, "[{index}]")?,
                Segment::Index(index) => write!(f, "<{index}>")?,
            }
        }
        Ok(())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    NullNotAllowed,
    TypeMismatch {
        expected: Vec<String>,
        actual: ValueKind,
    },
    BelowMin {
        min: String,
        actual: String,
    },
    AboveMax {
        max: String,
        actual: String,
    },
    NotAllowed {
        value: String,
    },
    Forbidden {
        value: String,
    },
    RegexMismatch {
        pattern: String,
        value: String,
    },
    TooShort {
        min_length: usize,
        actual: usize,
    },
    TooLong {
        max_length: usize,
        actual: usize,
    },
    EmptyNotAllowed,
    TooFewIndexes {
        min: usize,
        actual: usize,
    },
    TooManyIndexes {
        max: usize,
        actual: usize,
    },
    IndexCountMismatch {
        expected: usize,
        actual: usize,
    },
    ElementNotScalar {
        actual: ValueKind,
    },
    ElementTypeMismatch {
        expected: String,
        actual: ValueKind,
    },
    InvalidDuration {
        text: String,
        reason: String,
    },
    NegativeDuration {
        text: String,
    },
    InvalidTimePattern {
        expression: String,
        reason: String,
    },
    NonNumericValue {
        actual: ValueKind,
    },
    OrderingViolation {
        previous: String,
        current: String,
    },
    LengthMismatch {
        stamps: usize,
        values: usize,
    },
    InvalidResolution {
        reason: String,
    },
}

impl ViolationKind {
    /// Constraint key whose check produced this violation.
    pub fn constraint(&self) -> &'static str {
        match self {
            Self::NullNotAllowed => "nullable",
            Self::TypeMismatch { .. }
            | Self::ElementNotScalar { .. }
            | Self::ElementTypeMismatch { .. }
            | Self::InvalidDuration { .. }
            | Self::NegativeDuration { .. }
            | Self::InvalidTimePattern { .. }
            | Self::NonNumericValue { .. }
            | Self::OrderingViolation { .. }
            | Self::LengthMismatch { .. }
            | Self::InvalidResolution { .. } => "type",
            Self::BelowMin { .. } => "min",
            Self::AboveMax { .. } => "max",
            Self::NotAllowed { .. } => "allowed",
            Self::Forbidden { .. } => "forbidden",
            Self::RegexMismatch { .. } => "regex",
            Self::TooShort { .. } => "minlength",
            Self::TooLong { .. } => "maxlength",
            Self::EmptyNotAllowed => "empty",
            Self::TooFewIndexes { .. } => "min indexes",
            Self::TooManyIndexes { .. } => "max indexes",
            Self::IndexCountMismatch { .. } => "number of indexes",
        }
    }

    /// What the constraint asked for.
    pub fn expected(&self) -> String {
        match self {
            Self::NullNotAllowed => "non-null value".to_string(),
            Self::TypeMismatch { expected, .. } => expected.join(" or "),
            Self::BelowMin { min, .. } => format!(">= {min}"),
            Self::AboveMax { max, .. } => format!("<= {max}"),
            Self::NotAllowed { .. } => "allowed value".to_string(),
            Self::Forbidden { .. } => "value not forbidden".to_string(),
            Self::RegexMismatch { pattern, .. } => pattern.clone(),
            Self::TooShort { min_length, .. } => format!("length >= {min_length}"),
            Self::TooLong { max_length, .. } => format!("length <= {max_length}"),
            Self::EmptyNotAllowed => "non-empty value".to_string(),
            Self::TooFewIndexes { min, .. } => format!("index count >= {min}"),
            Self::TooManyIndexes { max, .. } => format!("index count <= {max}"),
            Self::IndexCountMismatch { expected, .. } => format!("index count {expected}"),
            Self::ElementNotScalar { .. } => "scalar element".to_string(),
            Self::ElementTypeMismatch { expected, .. } => expected.clone(),
            Self::InvalidDuration { .. } => "duration".to_string(),
            Self::NegativeDuration { .. } => "non-negative duration".to_string(),
            Self::InvalidTimePattern { .. } => "time pattern expression".to_string(),
            Self::NonNumericValue { .. } => "number".to_string(),
            Self::OrderingViolation { previous, .. } => format!("time stamp after {previous}"),
            Self::LengthMismatch { stamps, .. } => format!("{stamps} values"),
            Self::InvalidResolution { .. } => "positive resolution".to_string(),
        }
    }

    /// What the value had instead.
    pub fn actual(&self) -> String {
        match self {
            Self::NullNotAllowed => "null".to_string(),
            Self::TypeMismatch { actual, .. }
            | Self::ElementNotScalar { actual }
            | Self::ElementTypeMismatch { actual, .. }
            | Self::NonNumericValue { actual } => actual.to_string(),
            Self::BelowMin { actual, .. } | Self::AboveMax { actual, .. } => actual.clone(),
            Self::NotAllowed { value }
            | Self::Forbidden { value }
            | Self::RegexMismatch { value, .. } => value.clone(),
            Self::TooShort { actual, .. } | Self::TooLong { actual, .. } => actual.to_string(),
            Self::EmptyNotAllowed => "empty value".to_string(),
            Self::TooFewIndexes { actual, .. }
            | Self::TooManyIndexes { actual, .. }
            | Self::IndexCountMismatch { actual, .. } => actual.to_string(),
            Self::InvalidDuration { text, .. } | Self::NegativeDuration { text } => text.clone(),
            Self::InvalidTimePattern { expression, .. } => expression.clone(),
            Self::OrderingViolation { current, .. } => current.clone(),
            Self::LengthMismatch { values, .. } => format!("{values} values"),
            Self::InvalidResolution { reason } => reason.clone(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NullNotAllowed => "null value not allowed".to_string(),
            Self::TypeMismatch { expected, .. } => {
                format!("must be of {} type", expected.join(" or "))
            }
            Self::BelowMin { min, .. } => format!("min value is {min}"),
            Self::AboveMax { max, .. } => format!("max value is {max}"),
            Self::NotAllowed { value } | Self::Forbidden { value } => {
                format!("unallowed value {value}")
            }
            Self::RegexMismatch { pattern, .. } => {
                format!("value does not match regex '{pattern}'")
            }
            Self::TooShort { min_length, .. } => format!("min length is {min_length}"),
            Self::TooLong { max_length, .. } => format!("max length is {max_length}"),
            Self::EmptyNotAllowed => "empty values not allowed".to_string(),
            Self::TooFewIndexes { min, .. } => format!("must have index count > {min}"),
            Self::TooManyIndexes { max, .. } => format!("must have index count < {max}"),
            Self::IndexCountMismatch { expected, .. } => {
                format!("must have index count of {expected}")
            }
            Self::ElementNotScalar { actual } => {
                format!("elements must be scalars, found {actual}")
            }
            Self::ElementTypeMismatch { expected, actual } => {
                format!("must be of {expected} type, found {actual}")
            }
            Self::InvalidDuration { reason, .. } => reason.clone(),
            Self::NegativeDuration { text } => format!("duration '{text}' must not be negative"),
            Self::InvalidTimePattern { expression, reason } => {
                format!("invalid time pattern '{expression}': {reason}")
            }
            Self::NonNumericValue { actual } => format!("value must be numeric, found {actual}"),
            Self::OrderingViolation { previous, current } => format!(
                "time stamps must be strictly increasing, {current} does not follow {previous}"
            ),
            Self::LengthMismatch { stamps, values } => {
                format!("time series has {stamps} time stamps but {values} values")
            }
            Self::InvalidResolution { reason } => format!("invalid resolution: {reason}"),
        }
    }
}

/// A single failed constraint at a location inside the validated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub location: Location,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(location: Location, kind: ViolationKind) -> Self {
        Self { location, kind }
    }

    pub fn constraint(&self) -> &'static str {
        self.kind.constraint()
    }

    pub fn message(&self) -> String {
        if self.location.is_root() {
            self.kind.message()
        } else {
            format!("{}: {}", self.location, self.kind.message())
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
