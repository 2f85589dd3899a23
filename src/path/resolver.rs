// In: src/path/resolver.rs

//! Replays chains against concrete contexts.
//!
//! Reading folds every recorded step over the context. Writing folds all but
//! the last step and turns that last attribute or index read into a write.
//! Chains found inside step arguments are resolved against the same context
//! before the step that holds them runs.

use std::sync::Arc;

use super::chain::{Chain, Operation};
use super::classify::{is_assignable, is_lambda};
use super::operator::OperatorId;
use crate::config::{EmptyAssignment, LyneConfig};
use crate::error::LyneError;
use crate::value::{ops, Kwargs, Value};

/// Resolves chains under one shared configuration. Cheap to clone and safe to
/// use from many threads at once.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: Arc<LyneConfig>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Arc::new(LyneConfig::default()))
    }
}

impl Resolver {
    pub fn new(config: Arc<LyneConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LyneConfig {
        &self.config
    }

    //==============================================================================
    // 1. Read Resolution
    //==============================================================================

    /// Reads the value `chain` designates in `context`.
    ///
    /// A function-wrapped chain returns `f(context)`; every other chain folds
    /// its steps starting from `context`. The empty chain yields `context`.
    pub fn resolve(&self, chain: &Chain, context: &Value) -> Result<Value, LyneError> {
        self.resolve_at(chain, context, 0)
    }

    /// Resolves a step argument: chains are resolved, containers holding
    /// chains are rebuilt with those chains resolved, anything else is cloned.
    pub fn resolve_value(&self, value: &Value, context: &Value) -> Result<Value, LyneError> {
        self.resolve_arg(value, context, 0)
    }

    fn resolve_at(&self, chain: &Chain, context: &Value, depth: usize) -> Result<Value, LyneError> {
        if depth > self.config.max_nesting_depth {
            return Err(LyneError::NestingTooDeep(self.config.max_nesting_depth));
        }

        if is_lambda(chain) {
            let wrapped = chain.operations().first().and_then(|operation| operation.args.first());
            if let Some(callable) = wrapped {
                return ops::call(callable, std::slice::from_ref(context), &Kwargs::new());
            }
        }

        self.fold(chain.operations(), context, depth)
    }

    fn fold(&self, operations: &[Operation], context: &Value, depth: usize) -> Result<Value, LyneError> {
        let mut current = context.clone();
        for operation in operations {
            current = self.replay(operation, &current, context, depth)?;
        }
        Ok(current)
    }

    /// Resolves the arguments of one step, then applies it to `current`.
    fn replay(
        &self,
        operation: &Operation,
        current: &Value,
        context: &Value,
        depth: usize,
    ) -> Result<Value, LyneError> {
        let (args, kwargs) = self.resolve_arguments(operation, context, depth)?;
        let result = ops::apply(operation.op, current, &args, &kwargs)?;
        if self.config.trace_resolution {
            log::trace!(
                "{}({}) on {} -> {}",
                operation.op.name(),
                args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", "),
                current.type_name(),
                result.type_name()
            );
        }
        Ok(result)
    }

    fn resolve_arguments(
        &self,
        operation: &Operation,
        context: &Value,
        depth: usize,
    ) -> Result<(Vec<Value>, Kwargs), LyneError> {
        let args = operation
            .args
            .iter()
            .map(|arg| self.resolve_arg(arg, context, depth))
            .collect::<Result<Vec<_>, _>>()?;
        let kwargs = operation
            .kwargs
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.resolve_arg(value, context, depth)?)))
            .collect::<Result<Kwargs, LyneError>>()?;
        Ok((args, kwargs))
    }

    /// Containers are searched one level deep; dicts only in their values.
    fn resolve_arg(&self, value: &Value, context: &Value, depth: usize) -> Result<Value, LyneError> {
        let element = |item: &Value| match item {
            Value::Path(chain) => self.resolve_at(chain, context, depth + 1),
            other => Ok(other.clone()),
        };

        match value {
            Value::Path(chain) => self.resolve_at(chain, context, depth + 1),
            Value::Tuple(items) if items.iter().any(is_chain) => {
                Ok(Value::Tuple(items.iter().map(element).collect::<Result<_, _>>()?))
            }
            Value::Set(items) if items.iter().any(is_chain) => {
                Ok(Value::set(items.iter().map(element).collect::<Result<Vec<_>, _>>()?))
            }
            Value::List(items) => {
                let items = items.read().clone();
                if !items.iter().any(is_chain) {
                    return Ok(value.clone());
                }
                Ok(Value::list(items.iter().map(element).collect::<Result<Vec<_>, _>>()?))
            }
            Value::Dict(map) => {
                let entries: Vec<(Value, Value)> =
                    map.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                if !entries.iter().any(|(_, v)| is_chain(v)) {
                    return Ok(value.clone());
                }
                let rebuilt = entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), element(v)?)))
                    .collect::<Result<Vec<_>, LyneError>>()?;
                Value::dict(rebuilt)
            }
            other => Ok(other.clone()),
        }
    }

    //==============================================================================
    // 2. Write Resolution
    //==============================================================================

    /// Writes `value` at the place `chain` designates inside `context` and
    /// returns `context` itself (the same shared handle).
    pub fn assign(&self, chain: &Chain, context: &Value, value: Value) -> Result<Value, LyneError> {
        // 1. Only assignable chains may be written through.
        if !is_assignable(chain) {
            return Err(LyneError::NotAssignable(chain.to_string()));
        }

        // 2. The empty chain designates the whole context.
        let Some((last, prefix)) = chain.operations().split_last() else {
            return match self.config.empty_assignment {
                EmptyAssignment::Ignore => {
                    log::debug!("assignment to {} ignored: empty chain", chain);
                    Ok(context.clone())
                }
                EmptyAssignment::Reject => Err(LyneError::NotAssignable(format!(
                    "{} (assignment to the whole context)",
                    chain
                ))),
            };
        };

        // 3. Read up to the parent of the written slot.
        let target = self.fold(prefix, context, 0)?;

        // 4. Turn the final read into a write.
        let (args, _) = self.resolve_arguments(last, context, 0)?;
        let key = args.first().ok_or(LyneError::Arity {
            operator: last.op.name(),
            expected: "exactly 1",
            got: 0,
        })?;
        match last.op {
            OperatorId::GetItem => ops::set_item(&target, key, value)?,
            _ => {
                let name = key.as_str().ok_or_else(|| {
                    LyneError::Type(format!(
                        "attribute name must be string, not '{}'",
                        key.type_name()
                    ))
                })?;
                ops::set_attr(&target, name, value)?
            }
        }

        log::debug!("assigned through {}", chain);
        Ok(context.clone())
    }
}

fn is_chain(value: &Value) -> bool {
    matches!(value, Value::Path(_))
}

//==================================================================================
// 3. Free Functions (default configuration)
//==================================================================================

pub fn resolve(chain: &Chain, context: &Value) -> Result<Value, LyneError> {
    Resolver::default().resolve(chain, context)
}

pub fn resolve_value(value: &Value, context: &Value) -> Result<Value, LyneError> {
    Resolver::default().resolve_value(value, context)
}

pub fn assign(chain: &Chain, context: &Value, value: Value) -> Result<Value, LyneError> {
    Resolver::default().assign(chain, context, value)
}
