//! Principals and per-kind principal sets.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::value::{Value, dedupe, set_eq, union};

/// The kind label a principal identifier is filed under, e.g. `AWS` or `Service`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrincipalKind {
    /// Account, user and role principals (`AWS`)
    Aws,
    /// Service principals (`Service`)
    Service,
    /// Federated identity providers (`Federated`)
    Federated,
    /// Canonical user ids (`CanonicalUser`)
    CanonicalUser,
    /// Any other label, kept verbatim
    Other(String),
}

impl PrincipalKind {
    /// Fold an `Other` label that names a known kind into that kind, so a
    /// label always maps to exactly one key.
    fn canonical(self) -> Self {
        match self {
            Self::Other(label) => Self::from(label),
            kind => kind,
        }
    }
}

impl AsRef<str> for PrincipalKind {
    fn as_ref(&self) -> &str {
        match self {
            Self::Aws => "AWS",
            Self::Service => "Service",
            Self::Federated => "Federated",
            Self::CanonicalUser => "CanonicalUser",
            Self::Other(label) => label,
        }
    }
}

impl FromStr for PrincipalKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "AWS" => Self::Aws,
            "Service" => Self::Service,
            "Federated" => Self::Federated,
            "CanonicalUser" => Self::CanonicalUser,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Display for PrincipalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_ref())
    }
}

impl From<String> for PrincipalKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<PrincipalKind> for String {
    fn from(kind: PrincipalKind) -> Self {
        kind.as_ref().to_string()
    }
}

/// A single principal: one identifier under one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    kind: PrincipalKind,
    id: Value,
}

impl Principal {
    pub fn new(kind: PrincipalKind, id: impl Into<Value>) -> Self {
        Principal {
            kind: kind.canonical(),
            id: id.into(),
        }
    }

    /// An account, user or role, usually by ARN.
    pub fn aws(id: impl Into<Value>) -> Self {
        Principal::new(PrincipalKind::Aws, id)
    }

    /// A service principal such as `lambda.amazonaws.com`.
    pub fn service(name: impl Into<Value>) -> Self {
        Principal::new(PrincipalKind::Service, name)
    }

    pub fn federated(provider: impl Into<Value>) -> Self {
        Principal::new(PrincipalKind::Federated, provider)
    }

    pub fn canonical_user(id: impl Into<Value>) -> Self {
        Principal::new(PrincipalKind::CanonicalUser, id)
    }

    /// Everyone (`{"AWS": "*"}`).
    pub fn any() -> Self {
        Principal::aws("*")
    }

    pub fn kind(&self) -> &PrincipalKind {
        &self.kind
    }

    pub fn id(&self) -> &Value {
        &self.id
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Principal identifiers grouped by kind.
///
/// Kinds iterate in a fixed order; identifiers within a kind keep insertion
/// order. A kind mapped to an empty collection is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalSet(BTreeMap<PrincipalKind, Vec<Value>>);

impl PrincipalSet {
    pub fn new() -> Self {
        PrincipalSet::default()
    }

    pub fn from_principals<I>(principals: I) -> Self
    where
        I: IntoIterator<Item = Principal>,
    {
        let mut set = PrincipalSet::new();
        for principal in principals {
            set.insert(principal);
        }
        set
    }

    pub fn insert(&mut self, principal: Principal) {
        self.0
            .entry(principal.kind.canonical())
            .or_default()
            .push(principal.id);
    }

    pub fn extend(&mut self, kind: PrincipalKind, ids: impl IntoIterator<Item = Value>) {
        self.0.entry(kind.canonical()).or_default().extend(ids);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn get(&self, kind: &PrincipalKind) -> &[Value] {
        self.0
            .get(&kind.clone().canonical())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Non-empty kinds with their identifiers, in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrincipalKind, &[Value])> {
        self.0
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(kind, ids)| (kind, ids.as_slice()))
    }

    /// Every principal in the set, flattened in kind order.
    pub fn principals(&self) -> impl Iterator<Item = Principal> + '_ {
        self.iter().flat_map(|(kind, ids)| {
            ids.iter()
                .map(move |id| Principal::new(kind.clone(), id.clone()))
        })
    }

    /// Same kinds, and per kind the same identifiers up to order and duplicates.
    pub fn set_eq(&self, other: &PrincipalSet) -> bool {
        self.0
            .keys()
            .chain(other.0.keys())
            .all(|kind| set_eq(self.get(kind), other.get(kind)))
    }

    /// Per-kind union. `AWS` identifiers come out sorted when all of them are
    /// literals; deferred expressions cannot be ordered, so any deferred
    /// member keeps the whole kind in encounter order.
    pub fn union(&self, other: &PrincipalSet) -> PrincipalSet {
        let mut merged = BTreeMap::new();
        for kind in self.0.keys().chain(other.0.keys()) {
            if merged.contains_key(kind) {
                continue;
            }
            let mut ids = union(self.get(kind), other.get(kind));
            if *kind == PrincipalKind::Aws {
                sort_if_literal(&mut ids);
            }
            if !ids.is_empty() {
                merged.insert(kind.clone(), ids);
            }
        }
        PrincipalSet(merged)
    }

    /// Copy with duplicates removed inside every kind and empty kinds dropped.
    pub fn deduped(&self) -> PrincipalSet {
        PrincipalSet(
            self.iter()
                .map(|(kind, ids)| (kind.clone(), dedupe(ids)))
                .collect(),
        )
    }
}

fn sort_if_literal(ids: &mut [Value]) {
    if ids.iter().all(|id| id.as_literal().is_some()) {
        ids.sort_by(|a, b| a.as_literal().cmp(&b.as_literal()));
    }
}

impl FromIterator<Principal> for PrincipalSet {
    fn from_iter<T: IntoIterator<Item = Principal>>(iter: T) -> Self {
        PrincipalSet::from_principals(iter)
    }
}
