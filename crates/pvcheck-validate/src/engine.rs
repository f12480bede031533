//! Rule engine.
//!
//! Runs every record through rule selection and schema validation. Outcomes
//! are kept in ordered maps keyed by record identity, so the evaluation of a
//! collection does not depend on the order its records arrive in.

use std::collections::BTreeMap;

use pvcheck_model::{ParameterValueRecord, RecordKey};
use serde::Serialize;
use tracing::{debug, warn};

use crate::rule::{RuleId, RuleSet};
use crate::selector::{SelectionWarning, select};
use crate::validator::validate;
use crate::violation::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    /// No rule matched the record.
    Unchecked,
}

/// A violation together with the rule whose schema produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolation {
    pub rule: RuleId,
    #[serde(flatten)]
    pub violation: Violation,
}

impl RuleViolation {
    /// Ordering of violations merged from records sharing a key.
    fn sort_key(&self) -> (RuleId, String, &'static str, String, String, String) {
        let kind = &self.violation.kind;
        (
            self.rule,
            self.violation.location.to_string(),
            kind.constraint(),
            kind.message(),
            kind.expected(),
            kind.actual(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub status: OutcomeStatus,
    pub matched_rules: Vec<RuleId>,
    pub violations: Vec<RuleViolation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SelectionWarning>,
}

impl ValidationOutcome {
    fn merge(&mut self, other: ValidationOutcome) {
        self.matched_rules.extend(other.matched_rules);
        self.matched_rules.sort_unstable();
        self.matched_rules.dedup();
        self.violations.extend(other.violations);
        self.violations.sort_by_cached_key(RuleViolation::sort_key);
        self.warnings.extend(other.warnings);
        self.warnings
            .sort_by_cached_key(|warning| (warning.rule(), warning.message()));
        self.status = status_of(&self.matched_rules, &self.violations);
    }
}

/// Result of evaluating a collection of records against a rule set.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub outcomes: BTreeMap<RecordKey, ValidationOutcome>,
    /// Number of records each rule was applied to, zero for unused rules.
    pub rule_usage: BTreeMap<RuleId, usize>,
}

impl Evaluation {
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    /// Selection warnings of all records, in record order.
    pub fn warnings(&self) -> impl Iterator<Item = (&RecordKey, &SelectionWarning)> {
        self.outcomes
            .iter()
            .flat_map(|(key, outcome)| outcome.warnings.iter().map(move |warning| (key, warning)))
    }

    pub fn is_success(&self) -> bool {
        self.count(OutcomeStatus::Failed) == 0
    }
}

/// Evaluate `records` against `rules`.
pub fn evaluate<'a, I>(records: I, rules: &RuleSet) -> Evaluation
where
    I: IntoIterator<Item = &'a ParameterValueRecord>,
{
    let mut evaluation = Evaluation {
        outcomes: BTreeMap::new(),
        rule_usage: rules.iter().map(|rule| (rule.id, 0)).collect(),
    };

    for record in records {
        let outcome = evaluate_record(record, rules);
        for rule in &outcome.matched_rules {
            *evaluation.rule_usage.entry(*rule).or_default() += 1;
        }
        match evaluation.outcomes.get_mut(&record.key) {
            Some(existing) => {
                warn!(record = %record.key, "duplicate parameter value record");
                existing.merge(outcome);
            }
            None => {
                evaluation.outcomes.insert(record.key.clone(), outcome);
            }
        }
    }

    debug!(
        records = evaluation.outcomes.len(),
        passed = evaluation.count(OutcomeStatus::Passed),
        failed = evaluation.count(OutcomeStatus::Failed),
        unchecked = evaluation.count(OutcomeStatus::Unchecked),
        "evaluation finished"
    );
    evaluation
}

/// Evaluate a single record against every rule that selects it.
pub fn evaluate_record(record: &ParameterValueRecord, rules: &RuleSet) -> ValidationOutcome {
    let selection = select(&record.key, rules);
    for warning in &selection.warnings {
        warn!(record = %record.key, "{}", warning.message());
    }

    let mut violations = Vec::new();
    for rule in &selection.rules {
        violations.extend(
            validate(&record.value, &rule.schema)
                .into_iter()
                .map(|violation| RuleViolation {
                    rule: rule.id,
                    violation,
                }),
        );
    }
    let matched_rules: Vec<RuleId> = selection.rules.iter().map(|rule| rule.id).collect();
    let status = status_of(&matched_rules, &violations);
    debug!(
        record = %record.key,
        rules = matched_rules.len(),
        violations = violations.len(),
        ?status,
        "record evaluated"
    );

    ValidationOutcome {
        status,
        matched_rules,
        violations,
        warnings: selection.warnings,
    }
}

fn status_of(matched_rules: &[RuleId], violations: &[RuleViolation]) -> OutcomeStatus {
    if matched_rules.is_empty() {
        OutcomeStatus::Unchecked
    } else if violations.is_empty() {
        OutcomeStatus::Passed
    } else {
        OutcomeStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings;
    use pvcheck_model::Value;
    use serde_json::json;

    fn rules() -> RuleSet {
        parse_settings(&json!({
            "object_parameter_value": [
                {"class": "unit", "parameter": "cost", "rule": {"type": "number", "min": 0}},
                {"class": "unit", "rule": {"type": "number", "max": 10}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn record_failing_any_rule_fails() {
        let record = ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Integer(11));
        let outcome = evaluate_record(&record, &rules());
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.matched_rules.len(), 2);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].rule.to_string(), "object rule 2");
    }

    #[test]
    fn unmatched_records_are_unchecked() {
        let record = ParameterValueRecord::object("node", "cost", "n1", "Base", Value::Integer(1));
        let outcome = evaluate_record(&record, &rules());
        assert_eq!(outcome.status, OutcomeStatus::Unchecked);
    }

    #[test]
    fn usage_counts_include_unused_rules() {
        let records = vec![ParameterValueRecord::object(
            "unit",
            "capacity",
            "u1",
            "Base",
            Value::Integer(1),
        )];
        let evaluation = evaluate(&records, &rules());
        let usage: Vec<usize> = evaluation.rule_usage.values().copied().collect();
        assert_eq!(usage, [0, 1]);
        assert!(evaluation.is_success());
    }

    #[test]
    fn duplicate_records_merge_the_same_in_any_order() {
        let rules = parse_settings(&json!({
            "object_parameter_value": [
                {"class": "unit", "rule": {"type": "integer", "max": 0}}
            ]
        }))
        .unwrap();
        let a = ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Float(23.0));
        let b = ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Integer(5));

        let first = evaluate([&a, &b], &rules);
        let second = evaluate([&b, &a], &rules);
        assert_eq!(first.outcomes, second.outcomes);

        let outcome = first.outcomes.values().next().unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.violations.len(), 3);
        assert_eq!(first.rule_usage.values().copied().collect::<Vec<_>>(), [2]);
    }
}
