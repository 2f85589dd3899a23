// In: src/value/record.rs

//! User-supplied context objects.
//!
//! A `Record` is whatever the pipeline hands the resolver as a context (or
//! reaches through one). It only needs to support the capabilities the chains
//! resolved against it actually use; every method except attribute reads has a
//! default that reports the capability as missing.

use std::fmt;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::dynamic::{Kwargs, Value};
use crate::error::LyneError;
use crate::path::OperatorId;

pub trait Record: Send + Sync + fmt::Debug {
    fn type_name(&self) -> &str;

    fn get_attr(&self, name: &str) -> Result<Value, LyneError>;

    fn set_attr(&self, name: &str, _value: Value) -> Result<(), LyneError> {
        Err(LyneError::Type(format!(
            "cannot set attribute '{}' on read-only '{}' object",
            name,
            self.type_name()
        )))
    }

    fn get_item(&self, _key: &Value) -> Result<Value, LyneError> {
        Err(LyneError::Type(format!(
            "'{}' object is not subscriptable",
            self.type_name()
        )))
    }

    fn set_item(&self, _key: &Value, _value: Value) -> Result<(), LyneError> {
        Err(LyneError::Type(format!(
            "'{}' object does not support item assignment",
            self.type_name()
        )))
    }

    /// Records that override `call` should return true, so that a chain
    /// wrapping them is treated like one wrapping a function.
    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, _args: &[Value], _kwargs: &Kwargs) -> Result<Value, LyneError> {
        Err(LyneError::Type(format!(
            "'{}' object is not callable",
            self.type_name()
        )))
    }

    /// Hook for every other operator (arithmetic, comparisons, containment,
    /// unary and conversions). `Ok(None)` means "not supported here" and lets
    /// the built-in rules (or the other operand) take over.
    fn apply(
        &self,
        _op: OperatorId,
        _args: &[Value],
        _kwargs: &Kwargs,
    ) -> Result<Option<Value>, LyneError> {
        Ok(None)
    }

    fn repr(&self) -> String {
        format!("<{} object>", self.type_name())
    }
}

//==================================================================================
// Namespace: the stock record
//==================================================================================

/// A bag of named fields, reachable both as attributes (`ctx.image`) and as
/// string keys (`ctx["image"]`).
#[derive(Debug, Default)]
pub struct Namespace {
    fields: RwLock<HashMap<String, Value>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            fields: RwLock::new(fields),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.write().insert(name.into(), value.into())
    }

    /// Field names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    fn key_name<'a>(&self, key: &'a Value) -> Result<&'a str, LyneError> {
        key.as_str().ok_or_else(|| {
            LyneError::Type(format!(
                "namespace keys must be str, not '{}'",
                key.type_name()
            ))
        })
    }
}

impl Record for Namespace {
    fn type_name(&self) -> &str {
        "namespace"
    }

    fn get_attr(&self, name: &str) -> Result<Value, LyneError> {
        self.get(name).ok_or_else(|| LyneError::Attribute {
            type_name: "namespace".to_string(),
            name: name.to_string(),
        })
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), LyneError> {
        self.insert(name, value);
        Ok(())
    }

    fn get_item(&self, key: &Value) -> Result<Value, LyneError> {
        let name = self.key_name(key)?;
        self.get(name).ok_or_else(|| LyneError::Key(key.to_string()))
    }

    fn set_item(&self, key: &Value, value: Value) -> Result<(), LyneError> {
        let name = self.key_name(key)?;
        self.insert(name, value);
        Ok(())
    }

    fn apply(
        &self,
        op: OperatorId,
        args: &[Value],
        _kwargs: &Kwargs,
    ) -> Result<Option<Value>, LyneError> {
        match (op, args) {
            (OperatorId::Contains, [Value::Str(name)]) => {
                Ok(Some(Value::Bool(self.fields.read().contains_key(name.as_str()))))
            }
            (OperatorId::Contains, [_]) => Ok(Some(Value::Bool(false))),
            _ => Ok(None),
        }
    }

    fn repr(&self) -> String {
        let fields = self.fields.read();
        let mut entries: Vec<(&String, &Value)> = fields.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let body = entries
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        format!("namespace({})", body)
    }
}
