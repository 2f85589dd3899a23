//! This file is the root of the `lyne` Rust crate.
//!
//! `lyne` records symbolic paths into a per-record context (`P.image[0]`,
//! `P.size * 2`, ...) at pipeline-declaration time and replays them against
//! concrete records at run time, either to read a value or to write a stage's
//! result back.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules (`path`, `value`, `stage`, ...).
//! 2.  Re-exporting the small public surface most callers need.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod logging;
pub mod path;
pub mod stage;
pub mod value;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{EmptyAssignment, LyneConfig};
pub use error::LyneError;
pub use path::{
    assign, item, output, plain, render, resolve, resolve_value, stream, Chain, Family,
    OperatorId, PathKey, Resolver, Role, RoleSet,
};
pub use stage::StageSignature;
pub use value::{Func, Kwargs, Namespace, Record, Value};
