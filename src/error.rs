// In: src/error.rs

//! This module defines the single, unified error type for the entire lyne library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LyneError {
    // =========================================================================
    // === Chain Capability Errors (caller precondition violations)
    // =========================================================================
    /// Hashing was requested for a chain that contains non-path operators.
    #[error("unhashable operations in chain: {operators}")]
    Unhashable { operators: String },

    /// A path-only chain carries an argument that cannot be hashed.
    #[error("unhashable type: '{0}'")]
    UnhashableValue(String),

    #[error("cannot assign through chain `{0}`")]
    NotAssignable(String),

    #[error("nested chain arguments exceed the maximum depth of {0}")]
    NestingTooDeep(usize),

    #[error("operator '{operator}' expects {expected} argument(s), got {got}")]
    Arity {
        operator: &'static str,
        expected: &'static str,
        got: usize,
    },

    // =========================================================================
    // === Runtime Errors (raised while replaying a chain against a context)
    // =========================================================================
    #[error("'{type_name}' object has no attribute '{name}'")]
    Attribute { type_name: String, name: String },

    #[error("key not found: {0}")]
    Key(String),

    #[error("index out of range: {0}")]
    Index(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("value error: {0}")]
    Value(String),

    #[error("division by zero: {0}")]
    ZeroDivision(String),

    #[error("integer overflow: {0}")]
    Overflow(String),

    /// An error raised from inside a user-supplied function value.
    #[error("function '{name}' failed: {message}")]
    Function { name: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g. the log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config parsing.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl LyneError {
    /// Shorthand for raising an error from inside a [`crate::Func`].
    pub fn function(name: impl Into<String>, message: impl Into<String>) -> Self {
        LyneError::Function {
            name: name.into(),
            message: message.into(),
        }
    }
}
