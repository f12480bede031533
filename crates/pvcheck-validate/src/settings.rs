//! Settings file loader.
//!
//! The settings file is a JSON object with optional
//! `object_parameter_value` and `relationship_parameter_value` lists of rule
//! objects. Other top-level keys are ignored.

use std::path::Path;

use pvcheck_model::EntityCategory;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as Json};
use tracing::debug;

use crate::error::{ConfigError, Result, RuleError};
use crate::pattern::Pattern;
use crate::rule::{EntityPatterns, Rule, RuleId, RuleSet, Selector};
use crate::schema::Schema;

pub const OBJECT_RULES_KEY: &str = "object_parameter_value";
pub const RELATIONSHIP_RULES_KEY: &str = "relationship_parameter_value";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    objects: Option<Vec<String>>,
    #[serde(default)]
    dimensions: Option<usize>,
    #[serde(default)]
    alternative: Option<String>,
    rule: JsonMap<String, Json>,
}

/// Load and compile the rules of a settings file.
pub fn load_settings(path: &Path) -> Result<RuleSet> {
    let text = std::fs::read_to_string(path).map_err(|error| ConfigError::io(path, error))?;
    let json: Json = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&json)
}

/// Compile the rules of an already parsed settings document.
pub fn parse_settings(json: &Json) -> Result<RuleSet> {
    let object = json.as_object().ok_or(ConfigError::NotAnObject)?;
    let rules = RuleSet::new(
        parse_rules(object, OBJECT_RULES_KEY, EntityCategory::Object)?,
        parse_rules(object, RELATIONSHIP_RULES_KEY, EntityCategory::Relationship)?,
    );
    debug!(
        object_rules = rules.object.len(),
        relationship_rules = rules.relationship.len(),
        "settings compiled"
    );
    Ok(rules)
}

fn parse_rules(
    settings: &JsonMap<String, Json>,
    key: &'static str,
    category: EntityCategory,
) -> Result<Vec<Rule>> {
    let Some(entries) = settings.get(key) else {
        return Ok(Vec::new());
    };
    let entries = entries.as_array().ok_or(ConfigError::NotAList { key })?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = RuleId::new(category, index + 1);
            compile_rule(id, entry).map_err(|source| ConfigError::Rule { rule: id, source })
        })
        .collect()
}

fn compile_rule(id: RuleId, entry: &Json) -> std::result::Result<Rule, RuleError> {
    if !entry.is_object() {
        return Err(RuleError::NotAnObject);
    }
    let raw: RawRule = serde_json::from_value(entry.clone()).map_err(RuleError::Malformed)?;
    let entities = match id.category {
        EntityCategory::Object => {
            reject(raw.objects.is_some(), "objects", id.category)?;
            reject(raw.dimensions.is_some(), "dimensions", id.category)?;
            EntityPatterns::Object(pattern("object", raw.object.as_deref())?)
        }
        EntityCategory::Relationship => {
            reject(raw.object.is_some(), "object", id.category)?;
            let patterns = raw
                .objects
                .as_deref()
                .map(|objects| {
                    objects
                        .iter()
                        .map(|source| pattern("objects", Some(source)))
                        .collect::<std::result::Result<Vec<_>, _>>()
                })
                .transpose()?;
            if let Some(declared) = raw.dimensions {
                let count = patterns.as_ref().map_or(0, Vec::len);
                if declared != count {
                    return Err(RuleError::DimensionMismatch {
                        declared,
                        patterns: count,
                    });
                }
            }
            EntityPatterns::Relationship(patterns)
        }
    };
    Ok(Rule {
        id,
        selector: Selector {
            class: pattern("class", raw.class.as_deref())?,
            parameter: pattern("parameter", raw.parameter.as_deref())?,
            entities,
            alternative: pattern("alternative", raw.alternative.as_deref())?,
        },
        schema: Schema::compile(&raw.rule)?,
    })
}

fn reject(
    present: bool,
    field: &'static str,
    category: EntityCategory,
) -> std::result::Result<(), RuleError> {
    if present {
        return Err(RuleError::FieldNotAllowed {
            field,
            category: category.label(),
        });
    }
    Ok(())
}

fn pattern(field: &'static str, source: Option<&str>) -> std::result::Result<Pattern, RuleError> {
    Pattern::new(source.unwrap_or_default())
        .map_err(|source| RuleError::InvalidPattern { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_categories_yield_empty_rule_lists() {
        let rules = parse_settings(&json!({"comment": "ignored"})).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn rules_are_numbered_from_one() {
        let rules = parse_settings(&json!({
            "object_parameter_value": [
                {"rule": {"type": "number"}},
                {"class": "unit", "rule": {"min": 0}}
            ]
        }))
        .unwrap();
        assert_eq!(rules.object.len(), 2);
        assert_eq!(rules.object[1].id.to_string(), "object rule 2");
    }

    #[test]
    fn non_list_category_is_a_config_error() {
        let error = parse_settings(&json!({"object_parameter_value": {}})).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::NotAList {
                key: "object_parameter_value"
            }
        ));
    }

    #[test]
    fn errors_carry_the_rule_position() {
        let error = parse_settings(&json!({
            "relationship_parameter_value": [
                {"objects": ["a", "b"], "rule": {}},
                {"objects": ["a"], "rule": {"type": "tensor"}}
            ]
        }))
        .unwrap_err();
        assert_eq!(
            error.to_string(),
            "relationship rule 2: invalid \"rule\": unknown type 'tensor'"
        );
    }

    #[test]
    fn declared_dimensions_must_match_patterns() {
        let error = parse_settings(&json!({
            "relationship_parameter_value": [
                {"objects": ["a", "b"], "dimensions": 3, "rule": {}}
            ]
        }))
        .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Rule {
                source: RuleError::DimensionMismatch {
                    declared: 3,
                    patterns: 2
                },
                ..
            }
        ));
    }

    #[test]
    fn missing_schema_and_foreign_fields_are_rejected() {
        assert!(parse_settings(&json!({"object_parameter_value": [{"class": "a"}]})).is_err());
        assert!(
            parse_settings(&json!({"object_parameter_value": [{"objects": ["a"], "rule": {}}]}))
                .is_err()
        );
        assert!(parse_settings(&json!({"object_parameter_value": ["rule"]})).is_err());
    }

    #[test]
    fn invalid_patterns_fail_at_load_time() {
        let error =
            parse_settings(&json!({"object_parameter_value": [{"class": "(", "rule": {}}]}))
                .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Rule {
                source: RuleError::InvalidPattern { field: "class", .. },
                ..
            }
        ));
    }
}
