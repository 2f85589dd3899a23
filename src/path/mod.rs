// In: src/path/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: Symbolic Paths
// ====================================================================================
//
// A chain is a recording of operations applied to a not-yet-existing context.
// Declaration code builds chains from one of the four roots; run-time code
// replays them against each record.
//
//   1. [Recording (surface)]      plain().attr("image").item(0) + 1
//         |
//         `-> appends immutable `Operation`s, nothing is evaluated
//
//   2. [Classification (classify)] is_assignable / is_input / is_lambda / markers
//         |
//         `-> pure predicates over the step sequence and role tags
//
//   3. [Resolution (resolver)]    resolve(chain, ctx) / assign(chain, ctx, value)
//         |
//         `-> nested chains in arguments first, then each step via `value::ops`
//
//   4. [Rendering (render)]       "P.image[0] + 1", for diagnostics only
//
// ====================================================================================

pub mod chain;
pub mod classify;
pub mod operator;
pub mod render;
pub mod resolver;
mod surface;

pub use self::chain::{Chain, Family, Operation, PathKey, Role, RoleSet};
pub use self::operator::{OperatorId, OperatorKind};
pub use self::render::render;
pub use self::resolver::{assign, resolve, resolve_value, Resolver};

/// Root of chains over the current record (`P`).
pub fn plain() -> Chain {
    Chain::root(Family::Plain)
}

/// Root of chains over the record stream (`S`).
pub fn stream() -> Chain {
    Chain::root(Family::Stream)
}

/// Root of chains over one item of a per-record collection (`I`).
pub fn item() -> Chain {
    Chain::root(Family::Item)
}

/// Root of the output slot (`O`). Never assignable, never an input.
pub fn output() -> Chain {
    Chain::root(Family::Output)
}

#[cfg(test)]
mod resolver_tests;
