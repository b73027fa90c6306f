//! Statement field values: literals and deferred expressions.
//!
//! A deferred expression stands for a value that is only known after a later
//! resolution stage, such as the ARN of a resource that has not been created
//! yet. Deferred expressions are compared by deep structural equality and are
//! otherwise passed through untouched.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::PolicyError;

/// An unresolved expression, rendered on the wire as a single-key object
/// (`{"Fn::GetAtt": ["User1E278A736", "Arn"]}`, `{"Ref": "Bucket"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct Deferred {
    op: String,
    args: JsonValue,
}

impl Deferred {
    pub fn new(op: impl Into<String>, args: JsonValue) -> Self {
        Deferred {
            op: op.into(),
            args,
        }
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn args(&self) -> &JsonValue {
        &self.args
    }
}

impl From<Deferred> for JsonValue {
    fn from(deferred: Deferred) -> Self {
        let mut map = Map::with_capacity(1);
        map.insert(deferred.op, deferred.args);
        JsonValue::Object(map)
    }
}

impl TryFrom<JsonValue> for Deferred {
    type Error = PolicyError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Object(map) if map.len() == 1 => {
                // len() == 1 above, so the iterator yields exactly one entry
                let Some((op, args)) = map.into_iter().next() else {
                    return Err(PolicyError::InvalidFormat(
                        "deferred expression has no operation".to_string(),
                    ));
                };
                Ok(Deferred { op, args })
            }
            other => Err(PolicyError::InvalidFormat(format!(
                "expected a single-key object for a deferred expression, found '{other}'"
            ))),
        }
    }
}

/// A single value in a resource, action or principal collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum Value {
    Literal(String),
    Deferred(Deferred),
}

impl Value {
    pub fn literal(s: impl Into<String>) -> Self {
        Value::Literal(s.into())
    }

    pub fn deferred(op: impl Into<String>, args: JsonValue) -> Self {
        Value::Deferred(Deferred::new(op, args))
    }

    /// Attribute of a not-yet-created resource, e.g. the `Arn` of `User1E278A736`.
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::deferred(
            "Fn::GetAtt",
            JsonValue::Array(vec![
                JsonValue::String(logical_id.into()),
                JsonValue::String(attribute.into()),
            ]),
        )
    }

    /// Reference to a not-yet-created resource by logical id.
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Value::deferred("Ref", JsonValue::String(logical_id.into()))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(s) => Some(s),
            Value::Deferred(_) => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::Deferred(_))
    }

    /// Structural equality. Literals never equal deferred expressions, and
    /// no coercion happens inside deferred arguments.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Literal(a), Value::Literal(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => a.op == b.op && a.args == b.args,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Literal(s) => write!(f, "{s}"),
            Value::Deferred(d) => write!(f, "{}", JsonValue::from(d.clone())),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(s)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Literal(s) => JsonValue::String(s),
            Value::Deferred(d) => d.into(),
        }
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = PolicyError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::String(s) => Ok(Value::Literal(s)),
            obj @ JsonValue::Object(_) => Ok(Value::Deferred(Deferred::try_from(obj)?)),
            other => Err(PolicyError::InvalidFormat(format!(
                "expected a string or a deferred expression, found '{other}'"
            ))),
        }
    }
}

/// Remove entries equal to an earlier entry, keeping first occurrences in place.
pub fn dedupe(values: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !out.iter().any(|kept| kept.equal(value)) {
            out.push(value.clone());
        }
    }
    out
}

/// Order-independent collection equality after duplicate removal.
pub fn set_eq(a: &[Value], b: &[Value]) -> bool {
    let a = dedupe(a);
    let b = dedupe(b);
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.equal(y)))
}

/// Union of two collections, `a`'s entries first, duplicates removed.
pub fn union(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut all = Vec::with_capacity(a.len() + b.len());
    all.extend_from_slice(a);
    all.extend_from_slice(b);
    dedupe(&all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yare::parameterized;

    #[parameterized(
        same_literal = { Value::literal("a"), Value::literal("a"), true },
        different_literal = { Value::literal("a"), Value::literal("b"), false },
        same_get_att = { Value::get_att("User1", "Arn"), Value::get_att("User1", "Arn"), true },
        different_logical_id = { Value::get_att("User1", "Arn"), Value::get_att("User2", "Arn"), false },
        different_attribute = { Value::get_att("User1", "Arn"), Value::get_att("User1", "Name"), false },
        ref_vs_get_att = { Value::reference("User1"), Value::get_att("User1", "Arn"), false },
        literal_vs_deferred_text = { Value::literal(r#"{"Ref":"User1"}"#), Value::reference("User1"), false },
        no_numeric_coercion = { Value::deferred("Fn::Select", json!([1, "x"])), Value::deferred("Fn::Select", json!([1.0, "x"])), false },
    )]
    fn test_value_equal(a: Value, b: Value, expected: bool) {
        assert_eq!(a.equal(&b), expected);
        assert_eq!(b.equal(&a), expected);
    }

    #[test]
    fn test_equal_is_reflexive() {
        for v in [
            Value::literal("a"),
            Value::reference("X"),
            Value::deferred("Fn::Join", json!(["", ["arn:", {"Ref": "AWS::Partition"}]])),
        ] {
            assert!(v.equal(&v));
        }
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let values = vec![
            Value::literal("b"),
            Value::literal("a"),
            Value::get_att("User1", "Arn"),
            Value::literal("b"),
            Value::get_att("User1", "Arn"),
        ];
        assert_eq!(
            dedupe(&values),
            vec![
                Value::literal("b"),
                Value::literal("a"),
                Value::get_att("User1", "Arn"),
            ]
        );
    }

    #[test]
    fn test_set_eq_ignores_order_and_duplicates() {
        let a = vec![Value::literal("a"), Value::literal("b"), Value::literal("a")];
        let b = vec![Value::literal("b"), Value::literal("a")];
        assert!(set_eq(&a, &b));
        assert!(!set_eq(&a, &[Value::literal("a")]));
        assert!(set_eq(&[], &[]));
    }

    #[test]
    fn test_union_preserves_first_seen_order() {
        let a = vec![Value::literal("a")];
        let b = vec![Value::literal("a"), Value::literal("b")];
        assert_eq!(union(&a, &b), vec![Value::literal("a"), Value::literal("b")]);
    }

    #[test]
    fn test_value_wire_form() {
        assert_eq!(serde_json::to_value(Value::literal("a")).unwrap(), json!("a"));
        assert_eq!(
            serde_json::to_value(Value::get_att("User1E278A736", "Arn")).unwrap(),
            json!({"Fn::GetAtt": ["User1E278A736", "Arn"]})
        );
        assert_eq!(
            serde_json::to_value(Value::reference("Bucket")).unwrap(),
            json!({"Ref": "Bucket"})
        );
    }

    #[test]
    fn test_value_from_wire_form() {
        let v: Value = serde_json::from_value(json!({"Ref": "Bucket"})).unwrap();
        assert!(v.equal(&Value::reference("Bucket")));
        let v: Value = serde_json::from_value(json!("s3:GetObject")).unwrap();
        assert_eq!(v.as_literal(), Some("s3:GetObject"));
    }

    #[parameterized(
        number = { json!(42) },
        array = { json!(["a"]) },
        multi_key_object = { json!({"Ref": "A", "Fn::GetAtt": ["B", "Arn"]}) },
        empty_object = { json!({}) },
        null = { json!(null) },
    )]
    fn test_value_rejects_unrecognized_shapes(input: JsonValue) {
        let result = Value::try_from(input);
        assert!(matches!(result, Err(PolicyError::InvalidFormat(_))));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::literal("a").to_string(), "a");
        assert_eq!(Value::reference("X").to_string(), r#"{"Ref":"X"}"#);
    }
}
