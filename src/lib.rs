//! Minimization of declarative access-policy documents.
//!
//! A [`PolicyDocument`] holds allow/deny [`Statement`]s. When the document is
//! resolved with [`DocumentOptions::minimize`] set, statements that differ in
//! exactly one of their resources, actions or principals are merged until
//! nothing more can be combined. The rendered document grants and denies
//! exactly what the input did.
//!
//! ```rust
//! use policy_minimizer::{DocumentOptions, PolicyDocument, Principal, Statement};
//!
//! let reader = Statement::allow()
//!     .action("s3:GetObject")
//!     .principal(Principal::aws("arn:aws:iam::111111111:user/user-name"));
//! let doc = PolicyDocument::with_statements(
//!     [
//!         reader.clone().resource("a").build()?,
//!         reader.resource("b").build()?,
//!     ],
//!     DocumentOptions::new().with_minimize(true),
//! );
//! assert_eq!(doc.resolve().statement.len(), 1);
//! # Ok::<(), policy_minimizer::PolicyError>(())
//! ```

pub use document::{
    DocumentOptions, OneOrMany, POLICY_VERSION, PolicyDocument, RenderedDocument,
    RenderedStatement,
};
pub use engine::{minimize, minimize_with_stats};
pub use error::PolicyError;
pub use loader::parse_document;
pub use merge::{Candidate, MergeKey, candidate, merge};
pub use types::{
    Conditions, Deferred, Effect, Principal, PrincipalKind, PrincipalSet, Statement,
    StatementBuilder, Value, dedupe, set_eq, union,
};

pub mod metrics;

mod document;
mod engine;
mod error;
mod loader;
mod merge;
mod types;
