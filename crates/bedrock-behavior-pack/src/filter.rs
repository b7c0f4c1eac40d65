//! Filter trees (`filters`, `biome_filter`).
//!
//! Parsing is lenient: anything that is not recognisably a combinator or a test
//! becomes an empty `AllOf`, which is always satisfied.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    AllOf(Vec<Filter>),
    AnyOf(Vec<Filter>),
    NoneOf(Vec<Filter>),
    Leaf(FilterTest),
}

/// A single `{ "test": ..., "operator": ..., "value": ... }` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTest {
    /// Lowercased test name.
    pub test: String,
    pub operator: Operator,
    pub value: Option<Value>,
    /// Accepted for compatibility; every test reads the evaluating entity.
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Operator {
    /// Unrecognised operators compare for equality.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "!=" | "<>" | "not" | "not_equals" => Self::NotEqual,
            "<" => Self::Less,
            "<=" => Self::LessOrEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterOrEqual,
            _ => Self::Equal,
        }
    }

    pub fn compare<T: PartialOrd>(self, actual: T, expected: T) -> bool {
        match self {
            Self::Equal => actual == expected,
            Self::NotEqual => actual != expected,
            Self::Less => actual < expected,
            Self::LessOrEqual => actual <= expected,
            Self::Greater => actual > expected,
            Self::GreaterOrEqual => actual >= expected,
        }
    }

    /// Equality-only comparison; ordered operators fail closed.
    pub fn compare_eq<T: PartialEq>(self, actual: T, expected: T) -> bool {
        match self {
            Self::Equal => actual == expected,
            Self::NotEqual => actual != expected,
            _ => false,
        }
    }
}

impl Filter {
    /// The always-satisfied filter.
    pub fn pass() -> Self {
        Filter::AllOf(Vec::new())
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => Filter::AllOf(items.iter().map(Filter::from_value).collect()),
            Value::Object(obj) => {
                if let Some(children) = obj.get("all_of") {
                    Filter::AllOf(children_of(children))
                } else if let Some(children) = obj.get("any_of") {
                    Filter::AnyOf(children_of(children))
                } else if let Some(children) = obj.get("none_of") {
                    Filter::NoneOf(children_of(children))
                } else if let Some(test) = obj.get("test").and_then(Value::as_str) {
                    Filter::Leaf(FilterTest {
                        test: test.trim().to_ascii_lowercase(),
                        operator: obj
                            .get("operator")
                            .and_then(Value::as_str)
                            .map(Operator::parse)
                            .unwrap_or_default(),
                        value: obj.get("value").cloned(),
                        subject: obj.get("subject").and_then(Value::as_str).map(String::from),
                    })
                } else {
                    Filter::pass()
                }
            }
            _ => Filter::pass(),
        }
    }
}

/// Combinator children: a list, or a single filter object.
fn children_of(value: &Value) -> Vec<Filter> {
    match value {
        Value::Array(items) => items.iter().map(Filter::from_value).collect(),
        Value::Object(_) => vec![Filter::from_value(value)],
        _ => Vec::new(),
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Filter::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_leaf() {
        let f = Filter::from_value(&json!({
            "test": "Is_Underwater", "subject": "self", "operator": "!=", "value": true
        }));
        match f {
            Filter::Leaf(t) => {
                assert_eq!(t.test, "is_underwater");
                assert_eq!(t.operator, Operator::NotEqual);
                assert_eq!(t.value, Some(json!(true)));
                assert_eq!(t.subject.as_deref(), Some("self"));
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn parse_nested_combinators() {
        let f = Filter::from_value(&json!({
            "any_of": [
                { "test": "on_fire" },
                { "none_of": [{ "test": "in_water" }] }
            ]
        }));
        match f {
            Filter::AnyOf(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(&children[1], Filter::NoneOf(c) if c.len() == 1));
            }
            other => panic!("expected any_of, got {other:?}"),
        }
    }

    #[test]
    fn array_is_all_of() {
        let f = Filter::from_value(&json!([{ "test": "on_fire" }, { "test": "in_water" }]));
        assert!(matches!(f, Filter::AllOf(c) if c.len() == 2));
    }

    #[test]
    fn unknown_shapes_pass() {
        assert_eq!(Filter::from_value(&json!({ "weird": 1 })), Filter::pass());
        assert_eq!(Filter::from_value(&json!(42)), Filter::pass());
        assert_eq!(Filter::from_value(&json!(null)), Filter::pass());
    }

    #[test]
    fn operator_aliases() {
        assert_eq!(Operator::parse("not"), Operator::NotEqual);
        assert_eq!(Operator::parse("<>"), Operator::NotEqual);
        assert_eq!(Operator::parse("equals"), Operator::Equal);
        assert_eq!(Operator::parse("="), Operator::Equal);
        assert_eq!(Operator::parse(">="), Operator::GreaterOrEqual);
    }

    #[test]
    fn ordered_compare() {
        assert!(Operator::Less.compare(1.0, 2.0));
        assert!(!Operator::Greater.compare(1.0, 2.0));
        assert!(!Operator::Less.compare_eq(true, true));
        assert!(Operator::NotEqual.compare_eq("a", "b"));
    }
}
