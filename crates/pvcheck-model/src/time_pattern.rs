//! Recurring period expressions used as time pattern keys.
//!
//! An expression is a `,`-separated union of `;`-separated intersections of
//! ranges such as `M1-4`, `WD6-7` or `h9`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Calendar unit of a [`PeriodRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
}

impl PeriodUnit {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Year => "Y",
            Self::Month => "M",
            Self::Day => "D",
            Self::Weekday => "WD",
            Self::Hour => "h",
            Self::Minute => "m",
            Self::Second => "s",
        }
    }

    /// Inclusive bounds for range endpoints.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Self::Year => (0, u32::MAX),
            Self::Month => (1, 12),
            Self::Day => (1, 31),
            Self::Weekday => (1, 7),
            Self::Hour => (1, 24),
            Self::Minute | Self::Second => (1, 60),
        }
    }

    fn split_token(term: &str) -> Option<(Self, &str)> {
        if let Some(rest) = term.strip_prefix("WD") {
            return Some((Self::Weekday, rest));
        }
        let mut chars = term.chars();
        let unit = match chars.next()? {
            'Y' => Self::Year,
            'M' => Self::Month,
            'D' => Self::Day,
            'h' => Self::Hour,
            'm' => Self::Minute,
            's' => Self::Second,
            _ => return None,
        };
        Some((unit, chars.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodRange {
    pub unit: PeriodUnit,
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}{}", self.unit.token(), self.start)
        } else {
            write!(f, "{}{}-{}", self.unit.token(), self.start, self.end)
        }
    }
}

/// A parsed time pattern key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePatternExpr {
    /// Union of intersections.
    pub alternatives: Vec<Vec<PeriodRange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimePatternError {
    #[error("time pattern is empty")]
    Empty,
    #[error("empty term in '{0}'")]
    EmptyTerm(String),
    #[error("unknown period unit in '{0}'")]
    UnknownUnit(String),
    #[error("invalid range '{0}'")]
    InvalidRange(String),
    #[error("{term} is out of bounds {min}-{max}")]
    OutOfBounds { term: String, min: u32, max: u32 },
    #[error("range '{0}' ends before it starts")]
    Reversed(String),
}

impl FromStr for TimePatternExpr {
    type Err = TimePatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TimePatternError::Empty);
        }
        let mut alternatives = Vec::new();
        for union_term in text.split(',') {
            let mut intersection = Vec::new();
            for term in union_term.split(';') {
                intersection.push(parse_range(term.trim(), text)?);
            }
            alternatives.push(intersection);
        }
        Ok(Self { alternatives })
    }
}

fn parse_range(term: &str, text: &str) -> Result<PeriodRange, TimePatternError> {
    if term.is_empty() {
        return Err(TimePatternError::EmptyTerm(text.to_string()));
    }
    let (unit, rest) =
        PeriodUnit::split_token(term).ok_or_else(|| TimePatternError::UnknownUnit(term.into()))?;
    let parse_bound = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| TimePatternError::InvalidRange(term.to_string()))
    };
    let (start, end) = match rest.split_once('-') {
        Some((start, end)) => (parse_bound(start)?, parse_bound(end)?),
        None => {
            let value = parse_bound(rest)?;
            (value, value)
        }
    };
    let (min, max) = unit.bounds();
    if start < min || end > max {
        return Err(TimePatternError::OutOfBounds {
            term: term.to_string(),
            min,
            max,
        });
    }
    if start > end {
        return Err(TimePatternError::Reversed(term.to_string()));
    }
    Ok(PeriodRange { unit, start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unions_and_intersections() {
        let expr: TimePatternExpr = "M1-4,M9-12;WD1-5".parse().unwrap();
        assert_eq!(expr.alternatives.len(), 2);
        assert_eq!(expr.alternatives[1].len(), 2);
        assert_eq!(expr.alternatives[1][1].unit, PeriodUnit::Weekday);
        assert_eq!(expr.alternatives[1][1].to_string(), "WD1-5");
    }

    #[test]
    fn single_value_is_a_degenerate_range() {
        let expr: TimePatternExpr = "h9".parse().unwrap();
        assert_eq!(
            expr.alternatives[0][0],
            PeriodRange {
                unit: PeriodUnit::Hour,
                start: 9,
                end: 9
            }
        );
    }

    #[test]
    fn rejects_out_of_bounds_and_reversed_ranges() {
        assert!(matches!(
            "M0-4".parse::<TimePatternExpr>(),
            Err(TimePatternError::OutOfBounds { .. })
        ));
        assert!(matches!(
            "WD1-8".parse::<TimePatternExpr>(),
            Err(TimePatternError::OutOfBounds { .. })
        ));
        assert!(matches!(
            "D20-3".parse::<TimePatternExpr>(),
            Err(TimePatternError::Reversed(_))
        ));
        assert!(matches!(
            "Q1-2".parse::<TimePatternExpr>(),
            Err(TimePatternError::UnknownUnit(_))
        ));
        assert!(matches!(
            "M1-4,".parse::<TimePatternExpr>(),
            Err(TimePatternError::EmptyTerm(_))
        ));
    }
}
