use serde_json::Value as JsonValue;

use super::*;
use crate::document::{DocumentOptions, PolicyDocument};
use crate::types::{Principal, StatementBuilder};


const PRINCIPAL_ARN1: &str = "arn:aws:iam::111111111:user/user-name";
const PRINCIPAL_ARN2: &str = "arn:aws:iam::111111111:role/role-name";

fn principal1() -> Principal {
    Principal::aws(PRINCIPAL_ARN1)
}

fn principal2() -> Principal {
    Principal::aws(PRINCIPAL_ARN2)
}

/// `Allow` on `resources` for `actions`, granted to `principal1`.
fn allow(resources: &[&str], actions: &[&str]) -> StatementBuilder {
    Statement::allow()
        .resources(resources.iter().copied())
        .actions(actions.iter().copied())
        .principal(principal1())
}

fn document(statements: &[Statement], minimize: bool) -> PolicyDocument {
    PolicyDocument::with_statements(
        statements.to_vec(),
        DocumentOptions::new().with_minimize(minimize),
    )
}

fn resolve(statements: &[Statement], minimize: bool) -> JsonValue {
    document(statements, minimize).to_json().unwrap()
}

fn assert_merged(statements: &[Statement], expected: JsonValue) {
    assert_eq!(resolve(statements, true)["Statement"], expected);
}

fn assert_no_merge(statements: &[Statement]) {
    assert_eq!(resolve(statements, true), resolve(statements, false));
}

fn assert_merged_if(do_merge: bool, statements: &[Statement], expected: JsonValue) {
    if do_merge {
        assert_merged(statements, expected);
    } else {
        assert_no_merge(statements);
    }
}
