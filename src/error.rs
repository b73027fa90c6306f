use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyError {
    #[error("statement has no effect")]
    MissingEffect,

    #[error("cannot set both '{field}' and '{negated}' on the same statement")]
    ConflictingFields { field: String, negated: String },

    #[error("failed to parse policy document: {0}")]
    ParseError(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl PolicyError {
    pub(crate) fn conflicting(field: &str, negated: &str) -> Self {
        PolicyError::ConflictingFields {
            field: field.to_string(),
            negated: negated.to_string(),
        }
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        PolicyError::ParseError(err.to_string())
    }
}
