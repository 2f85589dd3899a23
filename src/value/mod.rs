// In: src/value/mod.rs

//! The runtime side of the crate: the dynamic values that contexts are made
//! of, the `Record` trait for user objects, and the operator semantics the
//! resolver replays recorded steps with.

//==================================================================================
// 1. Module Declarations
//==================================================================================

mod dynamic;
mod json;
pub mod ops;
mod record;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::dynamic::{Complex, DictKey, Func, Kwargs, Mapping, Shared, Value};
pub use self::record::{Namespace, Record};

#[cfg(test)]
mod ops_tests;
