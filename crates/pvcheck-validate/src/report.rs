//! Validation reports.
//!
//! A [`Report`] summarises the evaluation of one record source: outcome
//! counts, one entry per violation or unchecked record, rule usage and
//! selection warnings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use pvcheck_model::RecordKey;
use serde::Serialize;

use crate::engine::{Evaluation, OutcomeStatus, RuleViolation};
use crate::error::ReportError;
use crate::rule::RuleId;

const REPORT_SCHEMA: &str = "pvcheck.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Process exit status of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExitStatus {
    Success,
    ValidationFailed,
    /// Configuration or I/O error.
    Error,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::ValidationFailed => 1,
            Self::Error => 2,
        }
    }

    /// The more severe of two statuses.
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub unchecked: usize,
}

impl ReportCounts {
    pub fn total(&self) -> usize {
        self.checked + self.unchecked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    Violation(RuleViolation),
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub record: RecordKey,
    #[serde(flatten)]
    pub finding: Finding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleUsage {
    pub rule: RuleId,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportWarning {
    pub record: RecordKey,
    pub rule: RuleId,
    pub message: String,
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record, self.message)
    }
}

/// Validation report of a single record source.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Where the records came from, usually a database URL.
    pub source: String,
    pub counts: ReportCounts,
    pub entries: Vec<ReportEntry>,
    pub rule_usage: Vec<RuleUsage>,
    pub warnings: Vec<ReportWarning>,
}

impl Report {
    pub fn build(source: impl Into<String>, evaluation: &Evaluation) -> Self {
        let passed = evaluation.count(OutcomeStatus::Passed);
        let failed = evaluation.count(OutcomeStatus::Failed);
        let counts = ReportCounts {
            checked: passed + failed,
            passed,
            failed,
            unchecked: evaluation.count(OutcomeStatus::Unchecked),
        };

        let mut entries = Vec::new();
        for (key, outcome) in &evaluation.outcomes {
            match outcome.status {
                OutcomeStatus::Passed => {}
                OutcomeStatus::Unchecked => entries.push(ReportEntry {
                    record: key.clone(),
                    finding: Finding::Unchecked,
                }),
                OutcomeStatus::Failed => {
                    entries.extend(outcome.violations.iter().map(|violation| ReportEntry {
                        record: key.clone(),
                        finding: Finding::Violation(violation.clone()),
                    }));
                }
            }
        }

        let rule_usage = evaluation
            .rule_usage
            .iter()
            .map(|(rule, records)| RuleUsage {
                rule: *rule,
                records: *records,
            })
            .collect();

        let warnings = evaluation
            .warnings()
            .map(|(key, warning)| ReportWarning {
                record: key.clone(),
                rule: warning.rule(),
                message: warning.message(),
            })
            .collect();

        Self {
            source: source.into(),
            counts,
            entries,
            rule_usage,
            warnings,
        }
    }

    pub fn is_success(&self) -> bool {
        self.counts.failed == 0
    }

    pub fn exit_status(&self, fail_on_unchecked: bool) -> ExitStatus {
        if self.counts.failed > 0 || (fail_on_unchecked && self.counts.unchecked > 0) {
            ExitStatus::ValidationFailed
        } else {
            ExitStatus::Success
        }
    }

    /// One line per failed record: `class - parameter - entity - alternative:
    /// message; message`.
    pub fn failure_lines(&self) -> Vec<String> {
        let mut messages: BTreeMap<&RecordKey, Vec<String>> = BTreeMap::new();
        for entry in &self.entries {
            if let Finding::Violation(violation) = &entry.finding {
                messages
                    .entry(&entry.record)
                    .or_default()
                    .push(violation.violation.message());
            }
        }
        messages
            .into_iter()
            .map(|(record, messages)| format!("{record}: {}", messages.join("; ")))
            .collect()
    }

    pub fn unchecked_records(&self) -> impl Iterator<Item = &RecordKey> {
        self.entries
            .iter()
            .filter(|entry| entry.finding == Finding::Unchecked)
            .map(|entry| &entry.record)
    }
}

#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    success: bool,
    reports: &'a [Report],
}

/// Write reports as pretty-printed JSON to `path`.
pub fn write_report_json(path: &Path, reports: &[Report]) -> Result<(), ReportError> {
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        success: reports.iter().all(Report::is_success),
        reports,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, format!("{json}\n")).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::settings::parse_settings;
    use pvcheck_model::{ParameterValueRecord, Value};
    use serde_json::json;

    fn report() -> Report {
        let rules = parse_settings(&json!({
            "object_parameter_value": [
                {"class": "unit", "rule": {"type": "integer", "max": 0}}
            ]
        }))
        .unwrap();
        let records = vec![
            ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Float(23.0)),
            ParameterValueRecord::object("unit", "cost", "u2", "Base", Value::Integer(0)),
            ParameterValueRecord::object("node", "demand", "n1", "Base", Value::Integer(3)),
        ];
        Report::build("file:///db.json", &evaluate(&records, &rules))
    }

    #[test]
    fn counts_and_exit_status() {
        let report = report();
        assert_eq!(
            report.counts,
            ReportCounts {
                checked: 2,
                passed: 1,
                failed: 1,
                unchecked: 1
            }
        );
        assert_eq!(report.exit_status(false), ExitStatus::ValidationFailed);
        assert_eq!(report.exit_status(false).code(), 1);
    }

    #[test]
    fn failure_lines_join_messages_per_record() {
        assert_eq!(
            report().failure_lines(),
            ["unit - cost - u1 - Base: must be of integer type; max value is 0"]
        );
    }

    #[test]
    fn unchecked_records_are_listed_separately() {
        let report = report();
        let unchecked: Vec<String> = report.unchecked_records().map(|r| r.to_string()).collect();
        assert_eq!(unchecked, ["node - demand - n1 - Base"]);
    }

    #[test]
    fn exit_status_combines_to_the_worst() {
        assert_eq!(
            ExitStatus::Success.combine(ExitStatus::ValidationFailed),
            ExitStatus::ValidationFailed
        );
        assert_eq!(
            ExitStatus::Error.combine(ExitStatus::Success),
            ExitStatus::Error
        );
    }
}
