//! Pairwise merge rules: when two statements can be combined, and how.
//!
//! Rigid fields (effect, sid, negated fields, conditions) must match
//! exactly. Of the mergeable fields (resources, actions, principals) at most
//! one may differ, and only when both statements populate it.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::types::{Statement, set_eq, union};

/// A field that may be unioned across two statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
pub enum MergeKey {
    Resources,
    Actions,
    Principals,
}

impl MergeKey {
    fn field_eq(self, a: &Statement, b: &Statement) -> bool {
        match self {
            MergeKey::Resources => set_eq(&a.resources, &b.resources),
            MergeKey::Actions => set_eq(&a.actions, &b.actions),
            MergeKey::Principals => a.principals.set_eq(&b.principals),
        }
    }

    fn populated(self, s: &Statement) -> bool {
        match self {
            MergeKey::Resources => !s.resources.is_empty(),
            MergeKey::Actions => !s.actions.is_empty(),
            MergeKey::Principals => !s.principals.is_empty(),
        }
    }
}

/// Outcome of comparing two statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Every field is equal; either statement stands for both.
    Duplicate,
    /// Exactly this mergeable field differs.
    On(MergeKey),
}

fn rigid_eq(a: &Statement, b: &Statement) -> bool {
    a.effect == b.effect
        && a.sid == b.sid
        && a.conditions == b.conditions
        && set_eq(&a.not_resources, &b.not_resources)
        && set_eq(&a.not_actions, &b.not_actions)
        && a.not_principals.set_eq(&b.not_principals)
}

/// Decide whether `a` and `b` can be combined without changing what they grant.
pub fn candidate(a: &Statement, b: &Statement) -> Option<Candidate> {
    use strum::IntoEnumIterator;

    if !rigid_eq(a, b) {
        return None;
    }

    let mut differing = MergeKey::iter().filter(|key| !key.field_eq(a, b));
    match (differing.next(), differing.next()) {
        (None, _) => Some(Candidate::Duplicate),
        (Some(key), None) if key.populated(a) && key.populated(b) => Some(Candidate::On(key)),
        _ => None,
    }
}

/// Combine two statements already known to be mergeable as `candidate`.
///
/// Rigid fields and the equal mergeable fields are taken from `a`; the
/// differing field becomes the deduplicated union, `a`'s entries first.
pub fn merge(a: &Statement, b: &Statement, candidate: Candidate) -> Statement {
    match candidate {
        Candidate::Duplicate => a.clone(),
        Candidate::On(MergeKey::Resources) => Statement {
            resources: union(&a.resources, &b.resources),
            ..a.clone()
        },
        Candidate::On(MergeKey::Actions) => Statement {
            actions: union(&a.actions, &b.actions),
            ..a.clone()
        },
        Candidate::On(MergeKey::Principals) => Statement {
            principals: a.principals.union(&b.principals),
            ..a.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Principal, PrincipalKind, Value};
    use serde_json::json;
    use yare::parameterized;

    const ARN1: &str = "arn:aws:iam::111111111:user/user-name";

    fn base() -> crate::types::StatementBuilder {
        Statement::allow()
            .resource("a")
            .action("service:Action")
            .principal(Principal::aws(ARN1))
    }

    #[test]
    fn test_identical_statements_are_duplicates() {
        let a = base().build().unwrap();
        let b = base().build().unwrap();
        assert_eq!(candidate(&a, &b), Some(Candidate::Duplicate));
    }

    #[test]
    fn test_set_equal_collections_are_duplicates() {
        let a = Statement::allow().resources(["a", "b"]).action("x").build().unwrap();
        let b = Statement::allow().resources(["b", "a", "b"]).action("x").build().unwrap();
        assert_eq!(candidate(&a, &b), Some(Candidate::Duplicate));
    }

    #[parameterized(
        resources = { Statement::allow().resource("b").action("service:Action").principal(Principal::aws(ARN1)), MergeKey::Resources },
        actions = { Statement::allow().resource("a").action("service:Other").principal(Principal::aws(ARN1)), MergeKey::Actions },
        principals = { Statement::allow().resource("a").action("service:Action").principal(Principal::service("svc.amazonaws.com")), MergeKey::Principals },
    )]
    fn test_single_differing_field(other: crate::types::StatementBuilder, key: MergeKey) {
        let a = base().build().unwrap();
        let b = other.build().unwrap();
        assert_eq!(candidate(&a, &b), Some(Candidate::On(key)));
    }

    #[test]
    fn test_two_differing_fields_are_not_mergeable() {
        let a = base().build().unwrap();
        let b = Statement::allow()
            .resource("b")
            .action("service:Other")
            .principal(Principal::aws(ARN1))
            .build()
            .unwrap();
        assert_eq!(candidate(&a, &b), None);
    }

    #[parameterized(
        effect = { Statement::deny().resource("b").action("service:Action").principal(Principal::aws(ARN1)) },
        sid = { base().resource("b").sid("Second") },
        condition = { base().resource("b").condition("StringLike", "something", json!("value")) },
    )]
    fn test_rigid_field_mismatch(other: crate::types::StatementBuilder) {
        let a = base().build().unwrap();
        let b = other.build().unwrap();
        assert_eq!(candidate(&a, &b), None);
    }

    #[test]
    fn test_negated_fields_are_rigid() {
        let a = Statement::allow().not_resources(["a"]).action("x").build().unwrap();
        let b = Statement::allow().not_resources(["b"]).action("x").build().unwrap();
        assert_eq!(candidate(&a, &b), None);

        let a = Statement::allow().resource("a").not_actions(["x"]).build().unwrap();
        let b = Statement::allow().resource("a").not_actions(["y"]).build().unwrap();
        assert_eq!(candidate(&a, &b), None);

        let a = Statement::allow()
            .resource("a")
            .not_principals([Principal::aws("p1")])
            .build()
            .unwrap();
        let b = Statement::allow()
            .resource("a")
            .not_principals([Principal::aws("p2")])
            .build()
            .unwrap();
        assert_eq!(candidate(&a, &b), None);
    }

    #[test]
    fn test_unpopulated_field_does_not_merge() {
        let a = Statement::allow().action("x").build().unwrap();
        let b = Statement::allow().resource("a").action("x").build().unwrap();
        assert_eq!(candidate(&a, &b), None);

        let a = Statement::allow().resource("a").action("x").build().unwrap();
        let b = Statement::allow()
            .resource("a")
            .action("x")
            .principal(Principal::any())
            .build()
            .unwrap();
        assert_eq!(candidate(&a, &b), None);
    }

    #[test]
    fn test_merge_resources_union() {
        let a = Statement::allow().resource("a").action("x").build().unwrap();
        let b = Statement::allow().resources(["a", "b"]).action("x").build().unwrap();
        let merged = merge(&a, &b, Candidate::On(MergeKey::Resources));
        assert_eq!(merged.resources(), &[Value::literal("a"), Value::literal("b")]);
        assert_eq!(merged.actions(), &[Value::literal("x")]);
    }

    #[test]
    fn test_merge_actions_union() {
        let a = Statement::allow().resource("a").action("x").build().unwrap();
        let b = Statement::allow().resource("a").action("y").build().unwrap();
        let merged = merge(&a, &b, Candidate::On(MergeKey::Actions));
        assert_eq!(merged.actions(), &[Value::literal("x"), Value::literal("y")]);
    }

    #[test]
    fn test_merge_principals_union() {
        let a = base().build().unwrap();
        let b = Statement::allow()
            .resource("a")
            .action("service:Action")
            .principal(Principal::service("svc.amazonaws.com"))
            .build()
            .unwrap();
        let merged = merge(&a, &b, Candidate::On(MergeKey::Principals));
        assert_eq!(merged.principals().get(&PrincipalKind::Aws), &[Value::literal(ARN1)]);
        assert_eq!(
            merged.principals().get(&PrincipalKind::Service),
            &[Value::literal("svc.amazonaws.com")]
        );
    }

    #[test]
    fn test_merge_keeps_rigid_fields() {
        let a = base()
            .condition("StringLike", "something", json!("value"))
            .build()
            .unwrap();
        let b = Statement::allow()
            .resource("b")
            .action("service:Action")
            .principal(Principal::aws(ARN1))
            .condition("StringLike", "something", json!("value"))
            .build()
            .unwrap();
        let merged = merge(&a, &b, Candidate::On(MergeKey::Resources));
        assert_eq!(merged.conditions(), a.conditions());
        assert_eq!(merged.effect(), a.effect());
    }

    #[test]
    fn test_merge_key_strum() {
        use std::str::FromStr;
        use strum::IntoEnumIterator;

        assert_eq!(MergeKey::Principals.to_string(), "Principals");
        assert_eq!(MergeKey::from_str("Actions").unwrap(), MergeKey::Actions);
        assert_eq!(
            MergeKey::iter().collect::<Vec<_>>(),
            vec![MergeKey::Resources, MergeKey::Actions, MergeKey::Principals]
        );
    }
}
