//! Schema validation for generator output.
//!
//! The validator is a pure, total function from an arbitrary JSON value to
//! either a [`DesignResult`] or a [`ValidationError`] listing every violated
//! constraint. It never repairs input.

use crate::config::ValidationConfig;
use crate::design::{DesignResult, Issue, Priority};
use crate::error::{ValidationError, Violation, ViolationKind};
use serde_json::{Map, Value};

/// Exact top-level key set of a generated design.
pub const TOP_LEVEL_KEYS: &[&str] = &["design_markdown", "issues"];

/// Fields of each issue object.
pub const ISSUE_FIELDS: &[&str] = &["title", "body", "labels", "priority", "order"];

pub const TITLE_MIN_CHARS: usize = 3;
pub const BODY_MIN_CHARS: usize = 10;
pub const ORDER_MIN: i64 = 1;

#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    config: ValidationConfig,
}

impl SchemaValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, value: &Value) -> Result<DesignResult, ValidationError> {
        let mut violations = Vec::new();

        let Some(root) = value.as_object() else {
            return Err(ValidationError {
                violations: vec![Violation::new(
                    "$",
                    ViolationKind::WrongType,
                    format!("expected an object, got {}", type_name(value)),
                )],
            });
        };

        if self.config.reject_unknown_keys {
            for key in root.keys() {
                if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                    violations.push(Violation::new(
                        key.as_str(),
                        ViolationKind::UnknownKey,
                        "unexpected top-level key",
                    ));
                }
            }
        }

        let design_markdown = required_string(root, "design_markdown", "design_markdown", 0, &mut violations);

        let mut issues = Vec::new();
        match root.get("issues") {
            None => violations.push(Violation::new("issues", ViolationKind::Missing, "field is required")),
            Some(Value::Array(items)) => {
                if self.config.enforce_issue_count && !self.config.issue_count.contains(items.len()) {
                    violations.push(Violation::new(
                        "issues",
                        ViolationKind::IssueCount,
                        format!(
                            "expected {} issues, got {}",
                            self.config.issue_count,
                            items.len()
                        ),
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    if let Some(issue) = validate_issue(item, &format!("issues[{i}]"), &mut violations) {
                        issues.push(issue);
                    }
                }
            }
            Some(other) => violations.push(Violation::new(
                "issues",
                ViolationKind::WrongType,
                format!("expected an array, got {}", type_name(other)),
            )),
        }

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        Ok(DesignResult {
            design_markdown: design_markdown.unwrap_or_default(),
            issues,
        })
    }
}

fn validate_issue(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<Issue> {
    let Some(obj) = value.as_object() else {
        violations.push(Violation::new(
            path,
            ViolationKind::WrongType,
            format!("expected an object, got {}", type_name(value)),
        ));
        return None;
    };

    let before = violations.len();

    let title = required_string(obj, "title", &format!("{path}.title"), TITLE_MIN_CHARS, violations);
    let body = required_string(obj, "body", &format!("{path}.body"), BODY_MIN_CHARS, violations);
    let labels = labels(obj, &format!("{path}.labels"), violations);
    let priority = priority(obj, &format!("{path}.priority"), violations);
    let order = order(obj, &format!("{path}.order"), violations);

    if violations.len() > before {
        return None;
    }

    Some(Issue {
        title: title?,
        body: body?,
        labels,
        priority,
        order: order?,
    })
}

fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    min_chars: usize,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        None => {
            violations.push(Violation::new(path, ViolationKind::Missing, "field is required"));
            None
        }
        Some(Value::String(s)) => {
            let len = s.chars().count();
            if len < min_chars {
                violations.push(Violation::new(
                    path,
                    ViolationKind::TooShort,
                    format!("must be at least {min_chars} characters (got {len})"),
                ));
                return None;
            }
            Some(s.clone())
        }
        Some(other) => {
            violations.push(Violation::new(
                path,
                ViolationKind::WrongType,
                format!("expected a string, got {}", type_name(other)),
            ));
            None
        }
    }
}

fn labels(obj: &Map<String, Value>, path: &str, violations: &mut Vec<Violation>) -> Vec<String> {
    match obj.get("labels") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut labels = Vec::with_capacity(items.len());
            for (j, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(s) => labels.push(s.to_string()),
                    None => violations.push(Violation::new(
                        format!("{path}[{j}]"),
                        ViolationKind::WrongType,
                        format!("expected a string, got {}", type_name(item)),
                    )),
                }
            }
            labels
        }
        Some(other) => {
            violations.push(Violation::new(
                path,
                ViolationKind::WrongType,
                format!("expected an array of strings, got {}", type_name(other)),
            ));
            Vec::new()
        }
    }
}

fn priority(obj: &Map<String, Value>, path: &str, violations: &mut Vec<Violation>) -> Priority {
    match obj.get("priority") {
        None => Priority::default(),
        Some(Value::String(s)) => s.parse().unwrap_or_else(|_| {
            violations.push(Violation::new(
                path,
                ViolationKind::InvalidEnum,
                format!("expected one of P0, P1, P2, got '{s}'"),
            ));
            Priority::default()
        }),
        Some(other) => {
            violations.push(Violation::new(
                path,
                ViolationKind::WrongType,
                format!("expected a string, got {}", type_name(other)),
            ));
            Priority::default()
        }
    }
}

fn order(obj: &Map<String, Value>, path: &str, violations: &mut Vec<Violation>) -> Option<u32> {
    let Some(value) = obj.get("order") else {
        violations.push(Violation::new(path, ViolationKind::Missing, "field is required"));
        return None;
    };
    let Some(n) = value.as_i64() else {
        let msg = if value.is_u64() {
            "integer is too large".to_string()
        } else {
            format!("expected an integer, got {}", type_name(value))
        };
        let kind = if value.is_u64() {
            ViolationKind::OutOfRange
        } else {
            ViolationKind::WrongType
        };
        violations.push(Violation::new(path, kind, msg));
        return None;
    };
    if n < ORDER_MIN {
        violations.push(Violation::new(
            path,
            ViolationKind::OutOfRange,
            format!("must be >= {ORDER_MIN} (got {n})"),
        ));
        return None;
    }
    match u32::try_from(n) {
        Ok(order) => Some(order),
        Err(_) => {
            violations.push(Violation::new(path, ViolationKind::OutOfRange, "integer is too large"));
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountRange;
    use serde_json::json;

    fn issue_json(order: i64) -> Value {
        json!({
            "title": format!("Issue number {order}"),
            "body": "## Acceptance Criteria\n- done\n## Notes\n- none",
            "labels": ["backend", "mvp"],
            "priority": "P1",
            "order": order
        })
    }

    fn design_json(n: i64) -> Value {
        json!({
            "design_markdown": "# Overview\nA thing.",
            "issues": (1..=n).map(issue_json).collect::<Vec<_>>()
        })
    }

    fn lenient() -> SchemaValidator {
        SchemaValidator::new(ValidationConfig {
            enforce_issue_count: false,
            ..Default::default()
        })
    }

    #[test]
    fn accepts_valid_design_and_preserves_fields() {
        let value = design_json(15);
        let design = SchemaValidator::default().validate(&value).unwrap();
        assert_eq!(design.design_markdown, "# Overview\nA thing.");
        assert_eq!(design.issues.len(), 15);
        let orders: Vec<u32> = design.issues.iter().map(|i| i.order).collect();
        assert_eq!(orders, (1..=15).collect::<Vec<u32>>());
        assert_eq!(design.issues[0].labels, vec!["backend", "mvp"]);
        assert_eq!(design.issues[0].priority, Priority::P1);
        assert_eq!(design.issues[0].title, "Issue number 1");
    }

    #[test]
    fn round_trips_through_serialization() {
        let value = design_json(20);
        let design = SchemaValidator::default().validate(&value).unwrap();
        let back = serde_json::to_value(&design).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn missing_design_markdown_is_field_specific() {
        let mut value = design_json(15);
        value.as_object_mut().unwrap().remove("design_markdown");
        let err = SchemaValidator::default().validate(&value).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].path, "design_markdown");
        assert_eq!(err.violations[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn order_zero_is_rejected_at_its_index() {
        let mut value = design_json(15);
        value["issues"][6]["order"] = json!(0);
        let err = SchemaValidator::default().validate(&value).unwrap_err();
        assert!(err.has_path("issues[6].order"));
        assert_eq!(err.violations[0].kind, ViolationKind::OutOfRange);
    }

    #[test]
    fn reports_every_violation_at_once() {
        let value = json!({
            "design_markdown": 42,
            "issues": [
                {"title": "ab", "body": "short", "priority": "P9", "order": 1.5},
                "not an object",
                {"title": "Valid title", "body": "Long enough body", "labels": ["ok", 3], "order": -2}
            ],
            "commentary": "here you go"
        });
        let err = lenient().validate(&value).unwrap_err();
        for path in [
            "commentary",
            "design_markdown",
            "issues[0].title",
            "issues[0].body",
            "issues[0].priority",
            "issues[0].order",
            "issues[1]",
            "issues[2].labels[1]",
            "issues[2].order",
        ] {
            assert!(err.has_path(path), "expected violation at {path}: {err}");
        }
        assert_eq!(err.violations.len(), 9);
    }

    #[test]
    fn priority_and_labels_have_defaults() {
        let value = json!({
            "design_markdown": "",
            "issues": [{"title": "Set up CI", "body": "Pipeline on push", "order": 1}]
        });
        let design = lenient().validate(&value).unwrap();
        assert_eq!(design.issues[0].priority, Priority::P2);
        assert!(design.issues[0].labels.is_empty());
    }

    #[test]
    fn null_priority_is_rejected() {
        let mut value = design_json(15);
        value["issues"][0]["priority"] = Value::Null;
        let err = SchemaValidator::default().validate(&value).unwrap_err();
        assert!(err.has_path("issues[0].priority"));
    }

    #[test]
    fn issue_count_is_enforced_by_default() {
        let err = SchemaValidator::default().validate(&design_json(14)).unwrap_err();
        assert!(err.has_path("issues"));
        assert_eq!(err.violations[0].kind, ViolationKind::IssueCount);
        assert!(SchemaValidator::default().validate(&design_json(26)).is_err());
        assert!(SchemaValidator::default().validate(&design_json(25)).is_ok());
    }

    #[test]
    fn issue_count_range_is_configurable() {
        let validator = SchemaValidator::new(ValidationConfig {
            issue_count: CountRange { min: 1, max: 3 },
            ..Default::default()
        });
        assert!(validator.validate(&design_json(3)).is_ok());
        assert!(validator.validate(&design_json(4)).is_err());
    }

    #[test]
    fn duplicate_orders_are_not_enforced() {
        let mut value = design_json(15);
        value["issues"][1]["order"] = json!(1);
        let design = SchemaValidator::default().validate(&value).unwrap();
        assert_eq!(design.duplicate_orders(), vec![1]);
    }

    #[test]
    fn unknown_keys_can_be_allowed() {
        let mut value = design_json(15);
        value["extra"] = json!(true);
        assert!(SchemaValidator::default().validate(&value).is_err());
        let validator = SchemaValidator::new(ValidationConfig {
            reject_unknown_keys: false,
            ..Default::default()
        });
        assert!(validator.validate(&value).is_ok());
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = SchemaValidator::default().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.violations[0].path, "$");
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn issues_must_be_an_array() {
        let value = json!({"design_markdown": "x", "issues": {"title": "nope"}});
        let err = SchemaValidator::default().validate(&value).unwrap_err();
        assert!(err.has_path("issues"));
        assert_eq!(err.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let value = json!({
            "design_markdown": "",
            "issues": [{"title": "ÄÖÜ", "body": "ééééééééééé", "order": 1}]
        });
        assert!(lenient().validate(&value).is_ok());
    }
}
