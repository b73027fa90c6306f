//! Data model for policy statements.
//!
//! Wire forms:
//! - Value: `"s3:GetObject"` (literal) or `{"Fn::GetAtt": ["User1", "Arn"]}` (deferred)
//! - Principal set: `{"AWS": [...], "Service": [...]}`
//! - Condition block: `{"StringLike": {"aws:username": "alice*"}}`
//!
//! Collections keep insertion order; equality between collections ignores
//! order and duplicates.

mod condition;
mod effect;
mod principal;
mod statement;
mod value;

pub use condition::Conditions;
pub use effect::Effect;
pub use principal::{Principal, PrincipalKind, PrincipalSet};
pub use statement::{Statement, StatementBuilder};
pub use value::{Deferred, Value, dedupe, set_eq, union};
