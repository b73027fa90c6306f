use serde_json::{Map, Value as JsonValue};

use crate::document::{DocumentOptions, PolicyDocument};
use crate::error::PolicyError;
use crate::types::{Conditions, Effect, Principal, PrincipalKind, PrincipalSet, Statement, Value};

const STATEMENT_KEYS: [&str; 9] = [
    "Sid",
    "Effect",
    "Resource",
    "NotResource",
    "Action",
    "NotAction",
    "Principal",
    "NotPrincipal",
    "Condition",
];

/// Parse a wire-format policy document.
///
/// `Statement` may be a single object or an array, and every collection may
/// be a bare value or an array. Strings are literals; single-key objects are
/// deferred expressions. Each statement is validated like one built by hand.
///
/// Example:
/// ```rust
/// use policy_minimizer::parse_document;
/// let doc = parse_document(r#"{
///     "Version": "2012-10-17",
///     "Statement": [
///         { "Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::bucket/*" },
///         { "Effect": "Allow", "Action": "s3:PutObject", "Resource": "arn:aws:s3:::bucket/*" }
///     ]
/// }"#).unwrap();
/// assert_eq!(doc.statement_count(), 2);
/// ```
pub fn parse_document(text: &str) -> Result<PolicyDocument, PolicyError> {
    let value: JsonValue = serde_json::from_str(text)?;
    PolicyDocument::from_json(&value, DocumentOptions::default())
}

impl PolicyDocument {
    /// Read a document from its wire-format JSON.
    pub fn from_json(value: &JsonValue, options: DocumentOptions) -> Result<Self, PolicyError> {
        let obj = as_object(value, "policy document")?;
        let statements = match obj.get("Statement") {
            None => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(Statement::from_json)
                .collect::<Result<_, _>>()?,
            Some(single @ JsonValue::Object(_)) => vec![Statement::from_json(single)?],
            Some(other) => {
                return Err(PolicyError::InvalidFormat(format!(
                    "'Statement' must be an object or an array, found '{other}'"
                )));
            }
        };
        Ok(PolicyDocument::with_statements(statements, options))
    }
}

impl Statement {
    /// Read one statement from its wire-format JSON.
    pub fn from_json(value: &JsonValue) -> Result<Self, PolicyError> {
        let obj = as_object(value, "statement")?;

        if let Some(unknown) = obj.keys().find(|k| !STATEMENT_KEYS.contains(&k.as_str())) {
            return Err(PolicyError::InvalidFormat(format!(
                "unknown statement key '{unknown}'"
            )));
        }

        let mut builder = Statement::builder()
            .resources(values(obj, "Resource")?)
            .not_resources(values(obj, "NotResource")?)
            .actions(values(obj, "Action")?)
            .not_actions(values(obj, "NotAction")?)
            .principal_set(principals(obj, "Principal")?)
            .not_principal_set(principals(obj, "NotPrincipal")?);

        if let Some(sid) = obj.get("Sid") {
            builder = builder.sid(as_str(sid, "Sid")?);
        }
        if let Some(effect) = obj.get("Effect") {
            let effect: Effect = as_str(effect, "Effect")?.parse().map_err(|_| {
                PolicyError::InvalidFormat(format!(
                    "'Effect' must be 'Allow' or 'Deny', found '{effect}'"
                ))
            })?;
            builder = builder.effect(effect);
        }
        if let Some(condition) = obj.get("Condition") {
            let conditions: Conditions =
                serde_json::from_value(condition.clone()).map_err(|e| {
                    PolicyError::InvalidFormat(format!("malformed 'Condition' block: {e}"))
                })?;
            builder = builder.conditions(conditions);
        }

        builder.build()
    }
}

fn as_object<'a>(
    value: &'a JsonValue,
    what: &str,
) -> Result<&'a Map<String, JsonValue>, PolicyError> {
    value.as_object().ok_or_else(|| {
        PolicyError::InvalidFormat(format!("{what} must be an object, found '{value}'"))
    })
}

fn as_str<'a>(value: &'a JsonValue, key: &str) -> Result<&'a str, PolicyError> {
    value.as_str().ok_or_else(|| {
        PolicyError::InvalidFormat(format!("'{key}' must be a string, found '{value}'"))
    })
}

fn one_or_many(value: &JsonValue) -> Result<Vec<Value>, PolicyError> {
    match value {
        JsonValue::Array(items) => items.iter().cloned().map(Value::try_from).collect(),
        single => Ok(vec![Value::try_from(single.clone())?]),
    }
}

fn values(obj: &Map<String, JsonValue>, key: &str) -> Result<Vec<Value>, PolicyError> {
    obj.get(key).map_or_else(|| Ok(Vec::new()), one_or_many)
}

fn principals(obj: &Map<String, JsonValue>, key: &str) -> Result<PrincipalSet, PolicyError> {
    match obj.get(key) {
        None => Ok(PrincipalSet::new()),
        Some(JsonValue::String(s)) if s == "*" => {
            Ok(PrincipalSet::from_principals([Principal::any()]))
        }
        Some(JsonValue::Object(kinds)) => {
            let mut set = PrincipalSet::new();
            for (kind, ids) in kinds {
                set.extend(PrincipalKind::from(kind.clone()), one_or_many(ids)?);
            }
            Ok(set)
        }
        Some(other) => Err(PolicyError::InvalidFormat(format!(
            "'{key}' must be \"*\" or an object keyed by principal kind, found '{other}'"
        ))),
    }
}
