// In: src/path/chain.rs

//! Recorded operations and the immutable chains built from them.
//!
//! A `Chain` never changes after construction. Appending copies the step
//! slice into a new `Arc<[Operation]>`, so a chain declared once can be shared
//! freely (across threads too) and resolved any number of times.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::operator::OperatorId;
use crate::error::LyneError;
use crate::value::{Kwargs, Value};

//==================================================================================
// 1. Operation
//==================================================================================

/// One recorded step: an operator with its positional and keyword arguments.
/// Arguments may themselves hold chains, resolved against the same context.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: OperatorId,
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
}

impl Operation {
    pub fn new(op: OperatorId, args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self { op, args, kwargs }
    }

    pub fn positional(op: OperatorId, args: Vec<Value>) -> Self {
        Self::new(op, args, Kwargs::new())
    }
}

//==================================================================================
// 2. Families & Role Tags
//==================================================================================

/// The root a chain was recorded from. Fixes the rendering letter and the
/// default role set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// The current record.
    Plain,
    /// The record stream as a whole.
    Stream,
    /// One item of a per-record collection.
    Item,
    /// The output slot of a stage.
    Output,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Plain, Family::Stream, Family::Item, Family::Output];

    pub fn letter(self) -> char {
        match self {
            Family::Plain => 'P',
            Family::Stream => 'S',
            Family::Item => 'I',
            Family::Output => 'O',
        }
    }

    pub fn default_roles(self) -> RoleSet {
        match self {
            Family::Plain => RoleSet::of(&[Role::Assignable]),
            Family::Stream => RoleSet::of(&[Role::Assignable, Role::Stream]),
            Family::Item => RoleSet::of(&[Role::Assignable, Role::Item]),
            Family::Output => RoleSet::of(&[Role::Output]),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assignable,
    InputOnly,
    LambdaWrapped,
    Stream,
    Item,
    Output,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Assignable,
        Role::InputOnly,
        Role::LambdaWrapped,
        Role::Stream,
        Role::Item,
        Role::Output,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A small set of role tags, fixed when a chain's root is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, role| set.with(*role))
    }

    #[must_use]
    pub fn with(self, role: Role) -> Self {
        RoleSet(self.0 | role.bit())
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

//==================================================================================
// 3. Chain
//==================================================================================

#[derive(Clone)]
pub struct Chain {
    family: Family,
    roles: RoleSet,
    ops: Arc<[Operation]>,
}

impl Chain {
    /// The empty chain of `family`, carrying the family's default roles.
    pub fn root(family: Family) -> Self {
        Self::with_roles(family, family.default_roles())
    }

    /// The empty chain of `family` with an explicit role set.
    pub fn with_roles(family: Family, roles: RoleSet) -> Self {
        Self {
            family,
            roles,
            ops: Arc::from(Vec::new()),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns a new chain with `operation` appended; `self` is untouched.
    pub fn append(&self, operation: Operation) -> Chain {
        let mut ops = Vec::with_capacity(self.ops.len() + 1);
        ops.extend(self.ops.iter().cloned());
        ops.push(operation);
        Chain {
            family: self.family,
            roles: self.roles,
            ops: Arc::from(ops),
        }
    }

    /// True iff every step is an attribute read or an index read.
    pub fn is_path_only(&self) -> bool {
        self.ops.iter().all(|operation| operation.op.is_path_step())
    }

    /// The hash key of a path-only chain.
    ///
    /// Fails with `Unhashable` naming every non-path operator, or with
    /// `UnhashableValue` if a step argument is a mutable container.
    pub fn key(&self) -> Result<PathKey, LyneError> {
        let offending: Vec<&str> = self
            .ops
            .iter()
            .filter(|operation| !operation.op.is_path_step())
            .map(|operation| operation.op.name())
            .collect();
        if !offending.is_empty() {
            return Err(LyneError::Unhashable {
                operators: offending.join(", "),
            });
        }

        let mut hasher = DefaultHasher::new();
        let mut steps = Vec::with_capacity(self.ops.len());
        for operation in self.ops.iter() {
            operation.op.hash(&mut hasher);
            operation.args.len().hash(&mut hasher);
            for arg in &operation.args {
                arg.hash_into(&mut hasher)?;
            }
            steps.push((operation.op, operation.args.clone()));
        }
        Ok(PathKey {
            steps,
            digest: hasher.finish(),
        })
    }
}

/// Structural equality over path-only chains. The family is ignored and a
/// chain with any other step equals nothing, itself included.
impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.is_path_only()
            && other.is_path_only()
            && self.ops.len() == other.ops.len()
            && self
                .ops
                .iter()
                .zip(other.ops.iter())
                .all(|(a, b)| a.op == b.op && a.args == b.args)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chain({})", self)
    }
}

//==================================================================================
// 4. PathKey
//==================================================================================

/// `Eq + Hash` identity of a path-only chain, usable as a map key.
#[derive(Debug, Clone)]
pub struct PathKey {
    steps: Vec<(OperatorId, Vec<Value>)>,
    digest: u64,
}

impl PathKey {
    pub fn steps(&self) -> &[(OperatorId, Vec<Value>)] {
        &self.steps
    }
}

impl PartialEq for PathKey {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.steps == other.steps
    }
}

impl Eq for PathKey {}

impl Hash for PathKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}
