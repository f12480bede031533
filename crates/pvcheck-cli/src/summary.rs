use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pvcheck_validate::Report;

use pvcheck_cli::types::{DatabaseOutcome, RunResult};

pub fn print_summary(result: &RunResult) {
    print_failures(result);
    println!(
        "Rules: {} object, {} relationship",
        result.object_rules, result.relationship_rules
    );
    if let Some(path) = &result.report_json {
        println!("Report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Database"),
        header_cell("Values"),
        header_cell("Checked"),
        header_cell("Passed"),
        header_cell("Failed"),
        header_cell("Unchecked"),
        header_cell("Warnings"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 7, CellAlignment::Center);
    for database in &result.databases {
        match &database.outcome {
            DatabaseOutcome::Validated(report) => {
                let counts = report.counts;
                table.add_row(vec![
                    Cell::new(&database.url),
                    Cell::new(counts.total()),
                    Cell::new(counts.checked),
                    count_cell(counts.passed, Color::Green),
                    count_cell(counts.failed, Color::Red),
                    count_cell(counts.unchecked, Color::Yellow),
                    count_cell(report.warnings.len(), Color::Yellow),
                    status_cell(report),
                ]);
            }
            DatabaseOutcome::Unreadable(_) => {
                table.add_row(vec![
                    Cell::new(&database.url),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("ERROR")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    println!("{table}");
    print_rule_usage(result);
}

/// Failure lines, unchecked values and unreadable databases go to stderr.
fn print_failures(result: &RunResult) {
    for line in finding_lines(result) {
        eprintln!("{line}");
    }
}

fn finding_lines(result: &RunResult) -> Vec<String> {
    let mut lines = Vec::new();
    for database in &result.databases {
        match &database.outcome {
            DatabaseOutcome::Validated(report) => {
                let failures = report.failure_lines();
                if !failures.is_empty() {
                    lines.push(format!("Failed values in {}:", database.url));
                    lines.extend(failures.into_iter().map(|line| format!("- {line}")));
                }
                let mut unchecked = report.unchecked_records().peekable();
                if unchecked.peek().is_some() {
                    lines.push(format!("Unchecked values in {}:", database.url));
                    lines.extend(unchecked.map(|record| format!("- {record}")));
                }
            }
            DatabaseOutcome::Unreadable(message) => {
                lines.push(format!("Could not read {}: {message}", database.url));
            }
        }
    }
    lines
}

fn print_rule_usage(result: &RunResult) {
    let reports: Vec<&Report> = result.reports().collect();
    let Some(first) = reports.first() else {
        return;
    };
    if first.rule_usage.is_empty() {
        return;
    }
    let mut table = Table::new();
    let mut header = vec![header_cell("Rule")];
    header.extend(reports.iter().map(|report| header_cell(&report.source)));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=reports.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (position, usage) in first.rule_usage.iter().enumerate() {
        let mut row = vec![Cell::new(usage.rule)];
        row.extend(reports.iter().map(|report| {
            let records = report
                .rule_usage
                .get(position)
                .map_or(0, |usage| usage.records);
            count_cell(records, Color::Reset)
        }));
        table.add_row(row);
    }
    println!();
    println!("Values processed per rule:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(report: &Report) -> Cell {
    if report.is_success() {
        Cell::new("PASS")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvcheck_cli::types::DatabaseResult;
    use pvcheck_model::{ParameterValueRecord, Value};
    use pvcheck_validate::{ExitStatus, evaluate, parse_settings};
    use serde_json::json;

    #[test]
    fn lists_failed_then_unchecked_values_per_database() {
        let rules = parse_settings(&json!({
            "object_parameter_value": [
                {"class": "unit", "parameter": "cost", "rule": {"type": "number", "min": 0}}
            ]
        }))
        .unwrap();
        let records = vec![
            ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Integer(-1)),
            ParameterValueRecord::object("node", "demand", "n1", "Base", Value::Integer(3)),
        ];
        let report = Report::build("db.json", &evaluate(&records, &rules));
        let result = RunResult {
            databases: vec![
                DatabaseResult {
                    url: "db.json".to_string(),
                    outcome: DatabaseOutcome::Validated(report),
                },
                DatabaseResult {
                    url: "sqlite:///spine.sqlite".to_string(),
                    outcome: DatabaseOutcome::Unreadable("unsupported scheme".to_string()),
                },
            ],
            object_rules: 1,
            relationship_rules: 0,
            report_json: None,
            exit_status: ExitStatus::Error,
        };

        assert_eq!(
            finding_lines(&result),
            [
                "Failed values in db.json:",
                "- unit - cost - u1 - Base: min value is 0",
                "Unchecked values in db.json:",
                "- node - demand - n1 - Base",
                "Could not read sqlite:///spine.sqlite: unsupported scheme",
            ]
        );
    }
}
