//! Access-control statements and their builder.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde_json::Value as JsonValue;

use crate::error::PolicyError;

use super::condition::Conditions;
use super::effect::Effect;
use super::principal::{Principal, PrincipalSet};
use super::value::Value;

/// One access-control rule.
///
/// At most one of each positive/negated pair is populated; [`StatementBuilder::build`]
/// enforces this. Statements are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub(crate) sid: Option<String>,
    pub(crate) effect: Effect,
    pub(crate) resources: Vec<Value>,
    pub(crate) not_resources: Vec<Value>,
    pub(crate) actions: Vec<Value>,
    pub(crate) not_actions: Vec<Value>,
    pub(crate) principals: PrincipalSet,
    pub(crate) not_principals: PrincipalSet,
    pub(crate) conditions: Conditions,
}

impl Statement {
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    pub fn allow() -> StatementBuilder {
        StatementBuilder::default().effect(Effect::Allow)
    }

    pub fn deny() -> StatementBuilder {
        StatementBuilder::default().effect(Effect::Deny)
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn resources(&self) -> &[Value] {
        &self.resources
    }

    pub fn not_resources(&self) -> &[Value] {
        &self.not_resources
    }

    pub fn actions(&self) -> &[Value] {
        &self.actions
    }

    pub fn not_actions(&self) -> &[Value] {
        &self.not_actions
    }

    pub fn principals(&self) -> &PrincipalSet {
        &self.principals
    }

    pub fn not_principals(&self) -> &PrincipalSet {
        &self.not_principals
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Copy with every collection deduplicated.
    pub fn deduped(&self) -> Statement {
        Statement {
            resources: super::value::dedupe(&self.resources),
            not_resources: super::value::dedupe(&self.not_resources),
            actions: super::value::dedupe(&self.actions),
            not_actions: super::value::dedupe(&self.not_actions),
            principals: self.principals.deduped(),
            not_principals: self.not_principals.deduped(),
            ..self.clone()
        }
    }

    pub(crate) fn with_sid(mut self, sid: impl Into<String>) -> Statement {
        self.sid = Some(sid.into());
        self
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{}(actions=[{}], resources=[{}], principals=[{}])",
            self.effect,
            self.actions.iter().join(", "),
            self.resources.iter().join(", "),
            self.principals.principals().join(", ")
        )
    }
}

/// Fluent constructor for [`Statement`].
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    sid: Option<String>,
    effect: Option<Effect>,
    resources: Vec<Value>,
    not_resources: Vec<Value>,
    actions: Vec<Value>,
    not_actions: Vec<Value>,
    principals: PrincipalSet,
    not_principals: PrincipalSet,
    conditions: Conditions,
}

impl StatementBuilder {
    pub fn new() -> Self {
        StatementBuilder::default()
    }

    pub fn sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    pub fn resources<I, V>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn not_resources<I, V>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.not_resources.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn action(mut self, action: impl Into<Value>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn actions<I, V>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn not_actions<I, V>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.not_actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principals.insert(principal);
        self
    }

    pub fn principals(mut self, principals: impl IntoIterator<Item = Principal>) -> Self {
        for principal in principals {
            self.principals.insert(principal);
        }
        self
    }

    pub fn not_principals(mut self, principals: impl IntoIterator<Item = Principal>) -> Self {
        for principal in principals {
            self.not_principals.insert(principal);
        }
        self
    }

    pub(crate) fn principal_set(mut self, principals: PrincipalSet) -> Self {
        self.principals = principals;
        self
    }

    pub(crate) fn not_principal_set(mut self, principals: PrincipalSet) -> Self {
        self.not_principals = principals;
        self
    }

    pub fn condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: JsonValue,
    ) -> Self {
        self.conditions.add(operator, key, value);
        self
    }

    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Validate and produce the statement.
    pub fn build(self) -> Result<Statement, PolicyError> {
        let effect = self.effect.ok_or(PolicyError::MissingEffect)?;

        if !self.resources.is_empty() && !self.not_resources.is_empty() {
            return Err(PolicyError::conflicting("Resource", "NotResource"));
        }
        if !self.actions.is_empty() && !self.not_actions.is_empty() {
            return Err(PolicyError::conflicting("Action", "NotAction"));
        }
        if !self.principals.is_empty() && !self.not_principals.is_empty() {
            return Err(PolicyError::conflicting("Principal", "NotPrincipal"));
        }

        Ok(Statement {
            sid: self.sid,
            effect,
            resources: self.resources,
            not_resources: self.not_resources,
            actions: self.actions,
            not_actions: self.not_actions,
            principals: self.principals,
            not_principals: self.not_principals,
            conditions: self.conditions,
        })
    }
}
