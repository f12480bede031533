//! Integration tests for validation runs over exported databases.

use std::fs;
use std::path::{Path, PathBuf};

use pvcheck_cli::commands::run_validation;
use pvcheck_cli::types::{DatabaseOutcome, RunOptions};
use pvcheck_validate::ExitStatus;
use serde_json::json;

const SETTINGS: &str = r#"{
    "object_parameter_value": [
        {"class": "unit", "parameter": "cost", "rule": {"type": "number", "min": 0}},
        {"class": "unit", "parameter": "ramp", "rule": {"type": "duration"}}
    ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn database(values: &[(&str, &str, &str, serde_json::Value)]) -> String {
    let entries: Vec<serde_json::Value> = values
        .iter()
        .map(|(class, parameter, object, value)| {
            json!({
                "class": class,
                "parameter": parameter,
                "object": object,
                "alternative": "Base",
                "value": value
            })
        })
        .collect();
    json!({"object_parameter_values": entries}).to_string()
}

fn options(dir: &Path, urls: Vec<String>) -> RunOptions {
    RunOptions {
        settings: write(dir, "settings.json", SETTINGS),
        urls,
        report_json: None,
        fail_on_unchecked: false,
    }
}

#[test]
fn passing_database_exits_successfully() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = write(
        dir.path(),
        "ok.json",
        &database(&[
            ("unit", "cost", "u1", json!(5)),
            ("unit", "ramp", "u1", json!({"type": "duration", "data": "3 hours"})),
        ]),
    );
    let result = run_validation(&options(dir.path(), vec![db.display().to_string()]))
        .expect("run completes");
    assert_eq!(result.exit_status, ExitStatus::Success);
    assert_eq!(result.object_rules, 2);
    let report = result.reports().next().expect("report");
    assert_eq!(report.counts.passed, 2);
}

#[test]
fn any_failing_database_fails_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let good = write(dir.path(), "good.json", &database(&[("unit", "cost", "u1", json!(1))]));
    let bad = write(dir.path(), "bad.json", &database(&[("unit", "cost", "u1", json!(-1))]));
    let result = run_validation(&options(
        dir.path(),
        vec![
            format!("file://{}", good.display()),
            format!("file://{}", bad.display()),
        ],
    ))
    .expect("run completes");
    assert_eq!(result.exit_status, ExitStatus::ValidationFailed);
    assert_eq!(result.databases.len(), 2);
    let failing = result.databases[1].report().expect("report");
    assert_eq!(
        failing.failure_lines(),
        ["unit - cost - u1 - Base: min value is 0"]
    );
}

#[test]
fn unchecked_values_fail_only_when_requested() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = write(dir.path(), "db.json", &database(&[("node", "demand", "n1", json!(3))]));
    let mut options = options(dir.path(), vec![db.display().to_string()]);
    let result = run_validation(&options).expect("run completes");
    assert_eq!(result.exit_status, ExitStatus::Success);

    options.fail_on_unchecked = true;
    let result = run_validation(&options).expect("run completes");
    assert_eq!(result.exit_status, ExitStatus::ValidationFailed);
}

#[test]
fn unreadable_database_is_an_error_but_others_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = write(dir.path(), "db.json", &database(&[("unit", "cost", "u1", json!(1))]));
    let result = run_validation(&options(
        dir.path(),
        vec![
            "sqlite:///spine.sqlite".to_string(),
            db.display().to_string(),
        ],
    ))
    .expect("run completes");
    assert_eq!(result.exit_status, ExitStatus::Error);
    assert!(matches!(
        result.databases[0].outcome,
        DatabaseOutcome::Unreadable(_)
    ));
    assert!(result.databases[1].report().is_some());
}

#[test]
fn invalid_settings_abort_the_run() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = write(
        dir.path(),
        "settings.json",
        r#"{"object_parameter_value": [{"rule": {"type": "tensor"}}]}"#,
    );
    let options = RunOptions {
        settings,
        urls: vec!["db.json".to_string()],
        report_json: None,
        fail_on_unchecked: false,
    };
    let error = run_validation(&options).expect_err("settings rejected");
    assert!(format!("{error:#}").contains("object rule 1"));
}

#[test]
fn report_json_is_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = write(
        dir.path(),
        "db.json",
        &database(&[("unit", "ramp", "u1", json!({"type": "duration", "data": "-1h"}))]),
    );
    let report_path = dir.path().join("out").join("report.json");
    let mut options = options(dir.path(), vec![db.display().to_string()]);
    options.report_json = Some(report_path.clone());

    let result = run_validation(&options).expect("run completes");
    assert_eq!(result.report_json.as_deref(), Some(report_path.as_path()));

    let payload: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report written"))
            .expect("report is JSON");
    assert_eq!(payload["schema"], "pvcheck.validation-report");
    assert_eq!(payload["success"], false);
    let entry = &payload["reports"][0]["entries"][0];
    assert_eq!(entry["kind"], "negative_duration");
    assert_eq!(entry["rule"], "object rule 2");
    assert_eq!(entry["record"]["entity"], "u1");
}
