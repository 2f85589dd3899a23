// In: src/path/classify.rs

//! Capability queries over chains.
//!
//! Role tags combine freely on a chain, but some combinations are excluded by
//! policy (an output sink is never assignable, never an input). The
//! predicates below decide capability from a chain's structure plus its tags;
//! call them wherever a capability decision is needed.

use super::chain::{Chain, Family, Role};
use super::operator::OperatorId;
use crate::value::Value;

/// Field name of the pass-through marker (`P._`): the whole context.
pub const PASS_THROUGH: &str = "_";

/// Field name of the skip marker (`P.skip` / `P["skip"]`).
pub const SKIP: &str = "skip";

pub fn is_path_only(chain: &Chain) -> bool {
    chain.is_path_only()
}

/// Assignable iff the family allows assignment, the chain is path-only and it
/// is not an output sink.
pub fn is_assignable(chain: &Chain) -> bool {
    let roles = chain.roles();
    roles.contains(Role::Assignable) && !roles.contains(Role::Output) && chain.is_path_only()
}

/// Anything that is not an output sink can be read as an input.
pub fn is_input(chain: &Chain) -> bool {
    !chain.roles().contains(Role::Output)
}

/// A single index step whose only argument is callable.
pub fn is_lambda(chain: &Chain) -> bool {
    match chain.operations() {
        [operation] => {
            operation.op == OperatorId::GetItem
                && matches!(operation.args.as_slice(), [arg] if arg.is_callable())
        }
        _ => false,
    }
}

/// Exactly one attribute read naming `_`.
pub fn is_pass_through(chain: &Chain) -> bool {
    match chain.operations() {
        [operation] => {
            operation.op.is_attribute_read() && single_name(&operation.args) == Some(PASS_THROUGH)
        }
        _ => false,
    }
}

/// Exactly one attribute or index read naming `skip`.
pub fn is_skip(chain: &Chain) -> bool {
    match chain.operations() {
        [operation] => operation.op.is_path_step() && single_name(&operation.args) == Some(SKIP),
        _ => false,
    }
}

fn single_name(args: &[Value]) -> Option<&str> {
    match args {
        [arg] => arg.as_str(),
        _ => None,
    }
}

pub fn has_role(chain: &Chain, role: Role) -> bool {
    match role {
        Role::Assignable => is_assignable(chain),
        Role::InputOnly => is_input(chain),
        Role::LambdaWrapped => is_lambda(chain),
        Role::Stream | Role::Item | Role::Output => chain.roles().contains(role),
    }
}

/// Non-chain values never carry a role.
pub fn value_has_role(value: &Value, role: Role) -> bool {
    value.as_chain().is_some_and(|chain| has_role(chain, role))
}

pub fn any_has_role<'a>(values: impl IntoIterator<Item = &'a Value>, role: Role) -> bool {
    values.into_iter().any(|value| value_has_role(value, role))
}

/// True if the chains in `values` matching `role` all come from at most one
/// family.
pub fn single_family_in<'a>(values: impl IntoIterator<Item = &'a Value>, role: Role) -> bool {
    let mut seen: Option<Family> = None;
    for chain in values.into_iter().filter_map(Value::as_chain) {
        if !has_role(chain, role) {
            continue;
        }
        match seen {
            Some(family) if family != chain.family() => return false,
            _ => seen = Some(chain.family()),
        }
    }
    true
}
