//! Rule selection.
//!
//! Decides which rules of a [`RuleSet`] apply to a record.

use pvcheck_model::RecordKey;
use serde::Serialize;

use crate::rule::{Rule, RuleId, RuleSet, SelectorMatch};

/// A rule that was skipped because its object patterns cannot line up with
/// the record's entity names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionWarning {
    DimensionMismatch {
        rule: RuleId,
        patterns: usize,
        dimensions: usize,
    },
}

impl SelectionWarning {
    pub fn rule(&self) -> RuleId {
        match self {
            Self::DimensionMismatch { rule, .. } => *rule,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::DimensionMismatch {
                rule,
                patterns,
                dimensions,
            } => format!(
                "{rule} has {patterns} object patterns but the relationship has {dimensions} dimensions"
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Matching rules in settings order.
    pub rules: Vec<&'a Rule>,
    pub warnings: Vec<SelectionWarning>,
}

impl Selection<'_> {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Find every rule of the record's entity category whose selector matches.
pub fn select<'a>(key: &RecordKey, rules: &'a RuleSet) -> Selection<'a> {
    let mut selection = Selection::default();
    for rule in rules.for_category(key.entity.category()) {
        match rule.selector.matches(key) {
            SelectorMatch::Matched => selection.rules.push(rule),
            SelectorMatch::NotMatched => {}
            SelectorMatch::DimensionMismatch {
                patterns,
                dimensions,
            } => selection.warnings.push(SelectionWarning::DimensionMismatch {
                rule: rule.id,
                patterns,
                dimensions,
            }),
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings;
    use pvcheck_model::EntityName;
    use serde_json::json;

    fn rules() -> RuleSet {
        parse_settings(&json!({
            "object_parameter_value": [
                {"class": "unit", "rule": {}},
                {"class": "node", "rule": {}},
                {"rule": {}}
            ],
            "relationship_parameter_value": [
                {"objects": ["unit", "node"], "rule": {}},
                {"rule": {}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn selects_matching_rules_in_order() {
        let rules = rules();
        let key = RecordKey::new("unit", "cost", EntityName::Object("u1".into()), "Base");
        let selection = select(&key, &rules);
        let ids: Vec<String> = selection.rules.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, ["object rule 1", "object rule 3"]);
        assert!(selection.warnings.is_empty());
    }

    #[test]
    fn dimension_mismatch_becomes_a_warning() {
        let rules = rules();
        let key = RecordKey::new(
            "unit__node__node",
            "flow",
            EntityName::Relationship(vec!["u".into(), "n1".into(), "n2".into()]),
            "Base",
        );
        let selection = select(&key, &rules);
        assert_eq!(selection.rules.len(), 1);
        assert_eq!(selection.rules[0].id.to_string(), "relationship rule 2");
        assert_eq!(
            selection.warnings[0].message(),
            "relationship rule 1 has 2 object patterns but the relationship has 3 dimensions"
        );
    }
}
