// In: src/stage.rs

//! Stage signatures: the inputs a pipeline stage reads and the slot it writes.
//!
//! A signature is declared once, next to the stage function, and applied per
//! record by the pipeline engine: `bind` produces the call arguments, `store`
//! writes the stage's result back. Sequencing, iteration and skip handling
//! belong to the engine.

use hashbrown::HashSet;

use crate::error::LyneError;
use crate::path::classify::{is_assignable, is_lambda, is_pass_through, is_skip};
use crate::path::{Chain, PathKey, Resolver};
use crate::value::{Kwargs, Value};

#[derive(Debug, Clone, Default)]
pub struct StageSignature {
    args: Vec<Value>,
    kwargs: Kwargs,
    output: Option<Chain>,
}

impl StageSignature {
    /// Declares the stage's positional and keyword inputs, typically chains.
    pub fn using(args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self {
            args,
            kwargs,
            output: None,
        }
    }

    /// Declares where the stage's result goes. The chain must be assignable;
    /// the pass-through marker is accepted and means "do not write".
    pub fn returns(mut self, chain: Chain) -> Result<Self, LyneError> {
        if !is_pass_through(&chain) && !is_assignable(&chain) {
            return Err(LyneError::NotAssignable(chain.to_string()));
        }
        self.output = Some(chain);
        Ok(self)
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    pub fn output(&self) -> Option<&Chain> {
        self.output.as_ref()
    }

    /// Resolves every declared input against `ctx`. A pass-through input
    /// binds to `ctx` itself.
    pub fn bind(&self, resolver: &Resolver, ctx: &Value) -> Result<(Vec<Value>, Kwargs), LyneError> {
        let bind_one = |value: &Value| match value.as_chain() {
            Some(chain) if is_pass_through(chain) => Ok(ctx.clone()),
            _ => resolver.resolve_value(value, ctx),
        };
        let args = self.args.iter().map(bind_one).collect::<Result<Vec<_>, _>>()?;
        let kwargs = self
            .kwargs
            .iter()
            .map(|(name, value)| Ok((name.clone(), bind_one(value)?)))
            .collect::<Result<Kwargs, LyneError>>()?;
        Ok((args, kwargs))
    }

    /// Writes `result` through the output chain and returns `ctx`.
    pub fn store(&self, resolver: &Resolver, ctx: &Value, result: Value) -> Result<Value, LyneError> {
        match &self.output {
            Some(chain) if !is_pass_through(chain) => resolver.assign(chain, ctx, result),
            _ => {
                log::debug!("stage has no output slot; result dropped");
                Ok(ctx.clone())
            }
        }
    }

    /// The keys of the plain field paths this stage reads. Markers and
    /// function-wrapped inputs are not fields.
    pub fn reads(&self) -> Result<HashSet<PathKey>, LyneError> {
        let mut keys = HashSet::new();
        for chain in self.input_chains() {
            if chain.is_empty()
                || !chain.is_path_only()
                || is_pass_through(chain)
                || is_skip(chain)
                || is_lambda(chain)
            {
                continue;
            }
            keys.insert(chain.key()?);
        }
        Ok(keys)
    }

    pub fn uses_skip(&self) -> bool {
        self.input_chains().any(is_skip)
    }

    /// Chains among the inputs, including those directly inside tuples and sets.
    fn input_chains(&self) -> impl Iterator<Item = &Chain> + '_ {
        self.args
            .iter()
            .chain(self.kwargs.values())
            .flat_map(|value| {
                let mut found: Vec<&Chain> = Vec::new();
                match value {
                    Value::Path(chain) => found.push(chain),
                    Value::Tuple(items) | Value::Set(items) => {
                        found.extend(items.iter().filter_map(Value::as_chain))
                    }
                    _ => {}
                }
                found
            })
    }
}
