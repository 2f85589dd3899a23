// In: src/value/dynamic.rs

//! The dynamic runtime value that contexts are built from and that chains
//! resolve to.
//!
//! `List` and `Dict` have reference semantics: cloning a `Value` shares the
//! underlying storage, so a write reached through a chain is visible from the
//! top-level context that owns the container.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{Equivalent, IndexMap};
use parking_lot::RwLock;

use super::record::Record;
use crate::error::LyneError;
use crate::path::Chain;

/// Keyword arguments of a recorded step or a function call. Ordering is
/// irrelevant to equality; the map keeps rendering deterministic.
pub type Kwargs = BTreeMap<String, Value>;

/// Shared, interior-mutable storage used by the mutable containers.
pub type Shared<T> = Arc<RwLock<T>>;

//==================================================================================
// 1. Supporting Types
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A dict key: a hashable value together with its digest.
///
/// Only values that `hash_into` accepts can become keys, so comparing two keys
/// never has to lock a shared container.
#[derive(Debug, Clone)]
pub struct DictKey {
    value: Value,
    digest: u64,
}

impl DictKey {
    /// Fails with `UnhashableValue` for lists, dicts, sets and tuples holding
    /// any of them.
    pub fn new(value: Value) -> Result<Self, LyneError> {
        let digest = digest_of(&value)?;
        Ok(Self { value, digest })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl From<String> for DictKey {
    fn from(key: String) -> Self {
        let mut hasher = DefaultHasher::new();
        hash_str(&key, &mut hasher);
        Self {
            digest: hasher.finish(),
            value: Value::Str(key),
        }
    }
}

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.value == other.value
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

/// Borrowed form of a `DictKey`, used for lookups.
struct KeyRef<'a> {
    value: &'a Value,
    digest: u64,
}

impl<'a> KeyRef<'a> {
    fn new(value: &'a Value) -> Result<Self, LyneError> {
        Ok(Self {
            digest: digest_of(value)?,
            value,
        })
    }
}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

impl Equivalent<DictKey> for KeyRef<'_> {
    fn equivalent(&self, key: &DictKey) -> bool {
        self.digest == key.digest && *self.value == key.value
    }
}

fn digest_of(value: &Value) -> Result<u64, LyneError> {
    let mut hasher = DefaultHasher::new();
    value.hash_into(&mut hasher)?;
    Ok(hasher.finish())
}

/// An insertion-ordered mapping. Replacing an existing key keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: IndexMap<DictKey, Value>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from key/value pairs; later duplicates replace earlier ones.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Self, LyneError> {
        let mut mapping = Mapping::new();
        for (key, value) in pairs {
            mapping.insert(key, value)?;
        }
        Ok(mapping)
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>, LyneError> {
        Ok(self.entries.get(&KeyRef::new(key)?))
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>, LyneError> {
        Ok(self.insert_key(DictKey::new(key)?, value))
    }

    pub fn insert_key(&mut self, key: DictKey, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, LyneError> {
        Ok(self.entries.contains_key(&KeyRef::new(key)?))
    }

    /// Copies every entry of `other` into `self`.
    pub fn extend_from(&mut self, other: &Mapping) {
        self.entries
            .extend(other.entries.iter().map(|(key, value)| (key.clone(), value.clone())));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(key, value)| (&key.value, value))
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.entries.get(key).is_some_and(|v| v == value))
    }
}

type FuncFn = dyn Fn(&[Value], &Kwargs) -> Result<Value, LyneError> + Send + Sync;

/// A named, invocable value. Functions compare and hash by identity.
#[derive(Clone)]
pub struct Func {
    name: Arc<str>,
    f: Arc<FuncFn>,
}

impl Func {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value], &Kwargs) -> Result<Value, LyneError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            f: Arc::new(f),
        }
    }

    /// Wraps a single-argument function; any other call shape is a type error.
    pub fn unary<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, LyneError> + Send + Sync + 'static,
    {
        let name: String = name.into();
        let label = name.clone();
        Self::new(name, move |args, kwargs| match (args, kwargs.is_empty()) {
            ([arg], true) => f(arg),
            _ => Err(LyneError::Type(format!(
                "{}() takes exactly one positional argument ({} given)",
                label,
                args.len() + kwargs.len()
            ))),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, args: &[Value], kwargs: &Kwargs) -> Result<Value, LyneError> {
        (self.f)(args, kwargs)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.f) as *const () as usize
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({})", self.name)
    }
}

//==================================================================================
// 2. The Value Enum
//==================================================================================

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(String),
    /// Ordered, immutable container.
    Tuple(Vec<Value>),
    /// Ordered, shared and mutable container.
    List(Shared<Vec<Value>>),
    /// Unordered, immutable container without duplicates.
    Set(Vec<Value>),
    /// Keyed, shared and mutable container.
    Dict(Shared<Mapping>),
    Object(Arc<dyn Record>),
    Func(Func),
    /// A nested symbolic chain, resolved against the context before use.
    Path(Chain),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// Builds a set, dropping duplicates (first occurrence wins).
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    /// Builds a dict, failing with `UnhashableValue` if any key is unhashable.
    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Self, LyneError> {
        Ok(Value::from(Mapping::from_pairs(entries)?))
    }

    pub fn object<R: Record + 'static>(record: R) -> Self {
        Value::Object(Arc::new(record))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Object(record) => record.type_name(),
            Value::Func(_) => "function",
            Value::Path(_) => "chain",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integers and booleans, the values usable as an index.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Functions, and records that declare themselves callable.
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Func(_) => true,
            Value::Object(record) => record.is_callable(),
            _ => false,
        }
    }

    pub fn as_chain(&self) -> Option<&Chain> {
        match self {
            Value::Path(chain) => Some(chain),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::List(items) => !items.read().is_empty(),
            Value::Dict(map) => !map.read().is_empty(),
            Value::Object(_) | Value::Func(_) | Value::Path(_) => true,
        }
    }

    /// Whether two values are the same shared object (containers, records,
    /// functions) or identical immutable data.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => record_addr(a) == record_addr(b),
            (Value::Func(a), Value::Func(b)) => a == b,
            _ => self == other,
        }
    }

    /// Feeds this value into `state`. Numerically equal ints, floats and bools
    /// hash identically; mutable containers are unhashable.
    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) -> Result<(), LyneError> {
        match self {
            Value::None => 0u8.hash(state),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Complex(_) => {
                match self.as_number() {
                    Some(number) => number.hash_into(state),
                    None => return Err(LyneError::UnhashableValue(self.type_name().to_string())),
                }
            }
            Value::Str(s) => hash_str(s, state),
            Value::Tuple(items) => {
                6u8.hash(state);
                items.len().hash(state);
                for item in items {
                    item.hash_into(state)?;
                }
            }
            Value::List(_) | Value::Set(_) | Value::Dict(_) => {
                return Err(LyneError::UnhashableValue(self.type_name().to_string()))
            }
            Value::Object(record) => {
                7u8.hash(state);
                record_addr(record).hash(state);
            }
            Value::Func(func) => {
                8u8.hash(state);
                func.addr().hash(state);
            }
            Value::Path(chain) => {
                9u8.hash(state);
                chain.key()?.hash(state);
            }
        }
        Ok(())
    }
}

fn hash_str<H: Hasher>(s: &str, state: &mut H) {
    5u8.hash(state);
    s.hash(state);
}

fn record_addr(record: &Arc<dyn Record>) -> usize {
    Arc::as_ptr(record) as *const () as usize
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Value::Dict(a), Value::Dict(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (Value::Object(a), Value::Object(b)) => record_addr(a) == record_addr(b),
            (Value::Func(a), Value::Func(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.num_eq(b),
                _ => false,
            },
        }
    }
}

//==================================================================================
// 3. Conversions
//==================================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Complex> for Value {
    fn from(value: Complex) -> Self {
        Value::Complex(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Value::Dict(Arc::new(RwLock::new(mapping)))
    }
}

impl From<Func> for Value {
    fn from(func: Func) -> Self {
        Value::Func(func)
    }
}

impl From<Chain> for Value {
    fn from(chain: Chain) -> Self {
        Value::Path(chain)
    }
}

impl From<&Chain> for Value {
    fn from(chain: &Chain) -> Self {
        Value::Path(chain.clone())
    }
}

impl From<Arc<dyn Record>> for Value {
    fn from(record: Arc<dyn Record>) -> Self {
        Value::Object(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}
