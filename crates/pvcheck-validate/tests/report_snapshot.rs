use pvcheck_model::{ParameterValueRecord, Value};
use pvcheck_validate::{Report, evaluate, parse_settings};
use serde_json::json;

fn report() -> Report {
    let rules = parse_settings(&json!({
        "object_parameter_value": [
            {"class": "unit", "parameter": "cost", "rule": {"type": "float", "max": 0.0}},
            {"class": "unit", "parameter": "units", "rule": {"type": "integer", "nullable": false}}
        ],
        "relationship_parameter_value": [
            {"class": "unit__node", "rule": {"type": "map", "number of indexes": 2}}
        ]
    }))
    .expect("settings compile");
    let records = vec![
        ParameterValueRecord::object("unit", "cost", "u1", "Base", Value::Float(23.0)),
        ParameterValueRecord::object("unit", "units", "u1", "Base", Value::Float(1.5)),
        ParameterValueRecord::object("unit", "units", "u2", "Base", Value::Null),
        ParameterValueRecord::relationship(
            "unit__node",
            "flow",
            ["u1", "n1"],
            "Base",
            Value::Integer(3),
        ),
    ];
    Report::build("file:///tmp/db.json", &evaluate(&records, &rules))
}

#[test]
fn failure_lines_snapshot() {
    insta::assert_snapshot!(report().failure_lines().join("\n"), @r"
    unit - cost - u1 - Base: max value is 0.0
    unit - units - u1 - Base: must be of integer type
    unit - units - u2 - Base: null value not allowed
    unit__node - flow - u1,n1 - Base: must be of map type; must have index count of 2
    ");
}

#[test]
fn report_entry_json_snapshot() {
    let report = report();
    insta::assert_json_snapshot!(report.entries[0], @r#"
    {
      "record": {
        "class": "unit",
        "parameter": "cost",
        "entity": "u1",
        "alternative": "Base"
      },
      "finding": "violation",
      "rule": "object rule 1",
      "location": "",
      "kind": "above_max",
      "max": "0.0",
      "actual": "23.0"
    }
    "#);
}
