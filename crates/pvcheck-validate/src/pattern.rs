//! Anchored regular expressions.

use regex::Regex;

/// A name pattern that must match the whole string.
///
/// An omitted or empty pattern matches everything, including the empty
/// string.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(source: &str) -> Result<Self, regex::Error> {
        if source.is_empty() {
            return Ok(Self::any());
        }
        Ok(Self {
            source: source.to_string(),
            regex: Some(anchored(source)?),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_any(&self) -> bool {
        self.regex.is_none()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.as_ref().is_none_or(|regex| regex.is_match(text))
    }
}

/// Compile `source` so it only matches complete strings.
pub fn anchored(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{source})$"))
}
