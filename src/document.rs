//! Policy documents and their wire-format rendering.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::engine;
use crate::error::PolicyError;
use crate::types::{Conditions, Effect, PrincipalSet, Statement, Value};

/// Version string written into every rendered document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// A collection rendered as a bare element when it holds exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// `None` for an empty slice, `One` for a single element, `Many` otherwise.
    pub fn from_slice(items: &[T]) -> Option<Self> {
        match items {
            [] => None,
            [one] => Some(OneOrMany::One(one.clone())),
            many => Some(OneOrMany::Many(many.to_vec())),
        }
    }
}

/// One statement in wire format. Unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenderedStatement {
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub resource: Option<OneOrMany<Value>>,
    #[serde(rename = "NotResource", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub not_resource: Option<OneOrMany<Value>>,
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub action: Option<OneOrMany<Value>>,
    #[serde(rename = "NotAction", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub not_action: Option<OneOrMany<Value>>,
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub principal: Option<BTreeMap<String, OneOrMany<Value>>>,
    #[serde(rename = "NotPrincipal", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub not_principal: Option<BTreeMap<String, OneOrMany<Value>>>,
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub condition: Option<Conditions>,
}

impl From<&Statement> for RenderedStatement {
    fn from(statement: &Statement) -> Self {
        RenderedStatement {
            sid: statement.sid().map(str::to_string),
            effect: statement.effect(),
            resource: OneOrMany::from_slice(statement.resources()),
            not_resource: OneOrMany::from_slice(statement.not_resources()),
            action: OneOrMany::from_slice(statement.actions()),
            not_action: OneOrMany::from_slice(statement.not_actions()),
            principal: render_principals(statement.principals()),
            not_principal: render_principals(statement.not_principals()),
            condition: (!statement.conditions().is_empty())
                .then(|| statement.conditions().clone()),
        }
    }
}

fn render_principals(set: &PrincipalSet) -> Option<BTreeMap<String, OneOrMany<Value>>> {
    let rendered: BTreeMap<String, OneOrMany<Value>> = set
        .iter()
        .filter_map(|(kind, ids)| OneOrMany::from_slice(ids).map(|ids| (kind.to_string(), ids)))
        .collect();
    (!rendered.is_empty()).then_some(rendered)
}

/// A complete policy document in wire format.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenderedDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<RenderedStatement>,
}

/// Document-level settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Merge redundant statements when resolving
    pub minimize: bool,
    /// Give every output statement without a sid its position as sid
    pub assign_sids: bool,
}

impl DocumentOptions {
    pub fn new() -> Self {
        DocumentOptions::default()
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    pub fn with_assign_sids(mut self, assign_sids: bool) -> Self {
        self.assign_sids = assign_sids;
        self
    }
}

/// An ordered list of statements plus the options used to render them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    statements: Vec<Statement>,
    options: DocumentOptions,
}

impl PolicyDocument {
    pub fn new(options: DocumentOptions) -> Self {
        PolicyDocument {
            statements: Vec::new(),
            options,
        }
    }

    pub fn with_statements<I>(statements: I, options: DocumentOptions) -> Self
    where
        I: IntoIterator<Item = Statement>,
    {
        PolicyDocument {
            statements: statements.into_iter().collect(),
            options,
        }
    }

    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn add_statements(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    /// Statements as added, before any minimization.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// The statements that [`PolicyDocument::resolve`] renders: minimized when
    /// the document asks for it, in input order otherwise.
    pub fn output_statements(&self) -> Vec<Statement> {
        let statements = if self.options.minimize {
            engine::minimize(&self.statements)
        } else {
            self.statements.clone()
        };

        if !self.options.assign_sids {
            return statements;
        }
        statements
            .into_iter()
            .enumerate()
            .map(|(i, s)| match s.sid() {
                Some(_) => s,
                None => s.with_sid(i.to_string()),
            })
            .collect()
    }

    pub fn resolve(&self) -> RenderedDocument {
        RenderedDocument {
            version: POLICY_VERSION.to_string(),
            statement: self
                .output_statements()
                .iter()
                .map(RenderedStatement::from)
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<JsonValue, PolicyError> {
        Ok(serde_json::to_value(self.resolve())?)
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.resolve().serialize(ser)
    }
}
