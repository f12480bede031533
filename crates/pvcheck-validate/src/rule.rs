//! Validation rules and the rule set they are loaded into.

use std::fmt;

use pvcheck_model::{EntityCategory, EntityName, RecordKey};
use serde::{Serialize, Serializer};

use crate::pattern::Pattern;
use crate::schema::Schema;

/// Position of a rule in its settings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId {
    pub category: EntityCategory,
    /// 1-based position.
    pub position: usize,
}

impl RuleId {
    pub fn new(category: EntityCategory, position: usize) -> Self {
        Self { category, position }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule {}", self.category, self.position)
    }
}

impl Serialize for RuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Entity name patterns of a rule.
#[derive(Debug, Clone)]
pub enum EntityPatterns {
    Object(Pattern),
    /// One pattern per dimension; `None` matches any dimensionality.
    Relationship(Option<Vec<Pattern>>),
}

impl EntityPatterns {
    pub fn category(&self) -> EntityCategory {
        match self {
            Self::Object(_) => EntityCategory::Object,
            Self::Relationship(_) => EntityCategory::Relationship,
        }
    }
}

/// Outcome of matching one rule's selector against one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMatch {
    Matched,
    NotMatched,
    /// Names matched but the record has a different number of dimensions
    /// than the rule has object patterns.
    DimensionMismatch { patterns: usize, dimensions: usize },
}

/// Which records a rule applies to.
#[derive(Debug, Clone)]
pub struct Selector {
    pub class: Pattern,
    pub parameter: Pattern,
    pub entities: EntityPatterns,
    pub alternative: Pattern,
}

impl Selector {
    pub fn matches(&self, key: &RecordKey) -> SelectorMatch {
        if self.entities.category() != key.entity.category()
            || !self.class.matches(&key.class)
            || !self.parameter.matches(&key.parameter)
            || !self.alternative.matches(&key.alternative)
        {
            return SelectorMatch::NotMatched;
        }
        match (&self.entities, &key.entity) {
            (EntityPatterns::Object(pattern), EntityName::Object(name)) => {
                if pattern.matches(name) {
                    SelectorMatch::Matched
                } else {
                    SelectorMatch::NotMatched
                }
            }
            (EntityPatterns::Relationship(None), EntityName::Relationship(_)) => {
                SelectorMatch::Matched
            }
            (EntityPatterns::Relationship(Some(patterns)), EntityName::Relationship(names)) => {
                if patterns.len() != names.len() {
                    return SelectorMatch::DimensionMismatch {
                        patterns: patterns.len(),
                        dimensions: names.len(),
                    };
                }
                if patterns
                    .iter()
                    .zip(names)
                    .all(|(pattern, name)| pattern.matches(name))
                {
                    SelectorMatch::Matched
                } else {
                    SelectorMatch::NotMatched
                }
            }
            _ => SelectorMatch::NotMatched,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub selector: Selector,
    pub schema: Schema,
}

/// All rules of a run, per entity category, in settings order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub object: Vec<Rule>,
    pub relationship: Vec<Rule>,
}

impl RuleSet {
    pub fn new(object: Vec<Rule>, relationship: Vec<Rule>) -> Self {
        Self {
            object,
            relationship,
        }
    }

    pub fn for_category(&self, category: EntityCategory) -> &[Rule] {
        match category {
            EntityCategory::Object => &self.object,
            EntityCategory::Relationship => &self.relationship,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.object.iter().chain(self.relationship.iter())
    }

    pub fn len(&self) -> usize {
        self.object.len() + self.relationship.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_empty() && self.relationship.is_empty()
    }
}
