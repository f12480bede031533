//! Calendar and clock spans.
//!
//! Durations are stored as the text the database holds (`"5D"`, `"1 hour"`,
//! `"3 months"`). Parsing is deferred to [`Duration::span`] so a malformed
//! duration is a validation finding rather than a decode failure.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDateTime, TimeDelta};
use thiserror::Error;

/// Duration as stored, possibly not yet known to be well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Duration(String);

impl Duration {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the stored text into a span.
    pub fn span(&self) -> Result<DurationSpan, DurationError> {
        self.0.parse()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit of a [`DurationSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 6] = [
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Month,
        Self::Year,
    ];

    /// Recognise a unit token.
    ///
    /// Single-letter tokens are case sensitive because `m` (minute) and `M`
    /// (month) differ; long names are not.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "s" => return Some(Self::Second),
            "m" => return Some(Self::Minute),
            "h" => return Some(Self::Hour),
            "D" | "d" => return Some(Self::Day),
            "M" => return Some(Self::Month),
            "Y" | "y" => return Some(Self::Year),
            _ => {}
        }
        match token.to_lowercase().as_str() {
            "second" | "seconds" => Some(Self::Second),
            "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            "month" | "months" => Some(Self::Month),
            "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    /// Plural long name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Second => "seconds",
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::Day => "days",
            Self::Month => "months",
            Self::Year => "years",
        }
    }
}

/// A parsed duration: signed magnitude in a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationSpan {
    pub magnitude: i64,
    pub unit: DurationUnit,
}

impl DurationSpan {
    pub fn new(magnitude: i64, unit: DurationUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn is_negative(&self) -> bool {
        self.magnitude < 0
    }

    /// Shift a timestamp by this span; `None` on overflow.
    pub fn add_to(&self, stamp: NaiveDateTime) -> Option<NaiveDateTime> {
        let delta = match self.unit {
            DurationUnit::Second => TimeDelta::try_seconds(self.magnitude)?,
            DurationUnit::Minute => TimeDelta::try_minutes(self.magnitude)?,
            DurationUnit::Hour => TimeDelta::try_hours(self.magnitude)?,
            DurationUnit::Day => TimeDelta::try_days(self.magnitude)?,
            DurationUnit::Month => return shift_months(stamp, self.magnitude),
            DurationUnit::Year => return shift_months(stamp, self.magnitude.checked_mul(12)?),
        };
        stamp.checked_add_signed(delta)
    }
}

fn shift_months(stamp: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        stamp.checked_add_months(count)
    } else {
        stamp.checked_sub_months(count)
    }
}

impl fmt::Display for DurationSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("duration is empty")]
    Empty,
    #[error("duration '{0}' has no magnitude")]
    MissingMagnitude(String),
    #[error("duration '{0}' has an invalid magnitude")]
    InvalidMagnitude(String),
    #[error("duration '{text}' has unknown unit '{unit}'")]
    UnknownUnit { text: String, unit: String },
    #[error("duration shifts a time stamp out of range")]
    OutOfRange,
}

impl FromStr for DurationSpan {
    type Err = DurationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DurationError::Empty);
        }
        let sign_len = usize::from(trimmed.starts_with(['-', '+']));
        let split = trimmed[sign_len..]
            .find(|c: char| !c.is_ascii_digit())
            .map_or(trimmed.len(), |pos| pos + sign_len);
        let (number, unit) = trimmed.split_at(split);
        if number.len() == sign_len {
            return Err(DurationError::MissingMagnitude(trimmed.to_string()));
        }
        let magnitude: i64 = number
            .parse()
            .map_err(|_| DurationError::InvalidMagnitude(trimmed.to_string()))?;
        let unit_token = unit.trim();
        let unit = DurationUnit::parse(unit_token).ok_or_else(|| DurationError::UnknownUnit {
            text: trimmed.to_string(),
            unit: unit_token.to_string(),
        })?;
        Ok(Self { magnitude, unit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(
            "5D".parse::<DurationSpan>().unwrap(),
            DurationSpan::new(5, DurationUnit::Day)
        );
        assert_eq!(
            "5 days".parse::<DurationSpan>().unwrap(),
            DurationSpan::new(5, DurationUnit::Day)
        );
        assert_eq!(
            "1 Hour".parse::<DurationSpan>().unwrap(),
            DurationSpan::new(1, DurationUnit::Hour)
        );
        assert_eq!(
            "15m".parse::<DurationSpan>().unwrap().unit,
            DurationUnit::Minute
        );
        assert_eq!("3M".parse::<DurationSpan>().unwrap().unit, DurationUnit::Month);
    }

    #[test]
    fn keeps_sign_for_negative_spans() {
        let span: DurationSpan = "-2 years".parse().unwrap();
        assert!(span.is_negative());
        assert_eq!(span.magnitude, -2);
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!("".parse::<DurationSpan>(), Err(DurationError::Empty));
        assert!(matches!(
            "days".parse::<DurationSpan>(),
            Err(DurationError::MissingMagnitude(_))
        ));
        assert!(matches!(
            "5 fortnights".parse::<DurationSpan>(),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(
            "5".parse::<DurationSpan>(),
            Err(DurationError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn shifts_calendar_units() {
        let start = stamp(2020, 1, 31);
        let month = DurationSpan::new(1, DurationUnit::Month);
        assert_eq!(month.add_to(start), Some(stamp(2020, 2, 29)));
        let year = DurationSpan::new(-1, DurationUnit::Year);
        assert_eq!(year.add_to(start), Some(stamp(2019, 1, 31)));
        let days = DurationSpan::new(2, DurationUnit::Day);
        assert_eq!(days.add_to(start), Some(stamp(2020, 2, 2)));
    }
}
