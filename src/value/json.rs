// In: src/value/json.rs

//! Conversions between `serde_json::Value` and runtime values, so contexts
//! can be loaded from (and results dumped to) JSON documents.

use serde_json::{Map, Number as JsonNumber, Value as Json};

use super::dynamic::{DictKey, Mapping, Value};
use super::record::Namespace;
use crate::error::LyneError;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::None,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from)),
            Json::Object(map) => {
                let mut mapping = Mapping::new();
                for (key, value) in map {
                    mapping.insert_key(DictKey::from(key), Value::from(value));
                }
                Value::from(mapping)
            }
        }
    }
}

impl Value {
    /// Converts back to JSON. Tuples and sets become arrays; dict keys must be
    /// strings; records, functions, chains, complex and non-finite floats have
    /// no JSON form.
    pub fn to_json(&self) -> Result<Json, LyneError> {
        let unsupported = || {
            LyneError::Type(format!(
                "'{}' value is not JSON serializable",
                self.type_name()
            ))
        };
        let json = match self {
            Value::None => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number(JsonNumber::from(*i)),
            Value::Float(f) => Json::Number(JsonNumber::from_f64(*f).ok_or_else(unsupported)?),
            Value::Str(s) => Json::String(s.clone()),
            Value::Tuple(items) | Value::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect::<Result<_, _>>()?)
            }
            Value::List(items) => Json::Array(
                items
                    .read()
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Dict(map) => {
                let mut object = Map::new();
                for (key, value) in map.read().iter() {
                    let key = key.as_str().ok_or_else(|| {
                        LyneError::Type(format!(
                            "JSON object keys must be str, not '{}'",
                            key.type_name()
                        ))
                    })?;
                    object.insert(key.to_string(), value.to_json()?);
                }
                Json::Object(object)
            }
            Value::Complex(_) | Value::Object(_) | Value::Func(_) | Value::Path(_) => {
                return Err(unsupported())
            }
        };
        Ok(json)
    }
}

impl Namespace {
    /// Builds a record context from a JSON object; nested objects stay dicts.
    pub fn from_json(json: Json) -> Result<Self, LyneError> {
        match json {
            Json::Object(map) => Ok(Namespace::from_pairs(
                map.into_iter().map(|(key, value)| (key, Value::from(value))),
            )),
            other => Err(LyneError::Type(format!(
                "a namespace needs a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
