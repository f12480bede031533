use anyhow::{Context, Result};
use tracing::{error, info, info_span};

use pvcheck_ingest::open_source;
use pvcheck_model::EntityCategory;
use pvcheck_validate::{
    Evaluation, ExitStatus, Report, RuleSet, evaluate, load_settings, write_report_json,
};

use crate::types::{DatabaseOutcome, DatabaseResult, RunOptions, RunResult};

/// Validate every database of `options` against the rules of its settings
/// file.
///
/// A settings problem aborts the run; an unreadable database is recorded
/// and the remaining databases are still validated.
pub fn run_validation(options: &RunOptions) -> Result<RunResult> {
    let rules = load_settings(&options.settings)
        .with_context(|| format!("load settings {}", options.settings.display()))?;
    for category in [EntityCategory::Object, EntityCategory::Relationship] {
        info!("{}", rule_count_line(rules.for_category(category).len(), category));
    }

    let mut databases = Vec::with_capacity(options.urls.len());
    let mut exit_status = ExitStatus::Success;
    for url in &options.urls {
        let span = info_span!("database", url = %url);
        let _guard = span.enter();
        let outcome = match validate_database(url, &rules) {
            Ok(report) => {
                exit_status = exit_status.combine(report.exit_status(options.fail_on_unchecked));
                DatabaseOutcome::Validated(report)
            }
            Err(error) => {
                error!("{error:#}");
                exit_status = exit_status.combine(ExitStatus::Error);
                DatabaseOutcome::Unreadable(format!("{error:#}"))
            }
        };
        databases.push(DatabaseResult {
            url: url.clone(),
            outcome,
        });
    }

    let mut result = RunResult {
        databases,
        object_rules: rules.object.len(),
        relationship_rules: rules.relationship.len(),
        report_json: None,
        exit_status,
    };
    if let Some(path) = &options.report_json {
        let reports: Vec<Report> = result.reports().cloned().collect();
        write_report_json(path, &reports)
            .with_context(|| format!("write report {}", path.display()))?;
        result.report_json = Some(path.clone());
    }
    Ok(result)
}

fn validate_database(url: &str, rules: &RuleSet) -> Result<Report> {
    let source = open_source(url).with_context(|| format!("open database {url}"))?;
    let records = source
        .records()
        .with_context(|| format!("read database {url}"))?;
    let evaluation = evaluate(&records, rules);
    log_rule_usage(rules, &evaluation);
    Ok(Report::build(source.name(), &evaluation))
}

/// Per-rule progress lines of one database.
fn log_rule_usage(rules: &RuleSet, evaluation: &Evaluation) {
    for category in [EntityCategory::Object, EntityCategory::Relationship] {
        let category_rules = rules.for_category(category);
        for (index, rule) in category_rules.iter().enumerate() {
            let processed = evaluation
                .rule_usage
                .get(&rule.id)
                .copied()
                .unwrap_or_default();
            info!("{}", processed_line(processed, index, category_rules.len()));
        }
    }
}

fn rule_count_line(count: usize, category: EntityCategory) -> String {
    match count {
        0 => format!("No validation rules found for {category} parameter values."),
        1 => format!("Validating a single rule for {category} parameter values."),
        count => format!("Validating {count} rules for {category} parameter values."),
    }
}

fn processed_line(processed: usize, index: usize, total: usize) -> String {
    let position = index + 1;
    match processed {
        0 => format!("Rule {position}/{total}: no values found to process"),
        1 => format!("Rule {position}/{total}: 1 value processed"),
        processed => format!("Rule {position}/{total}: {processed} values processed"),
    }
}
