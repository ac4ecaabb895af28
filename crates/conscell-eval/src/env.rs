//! Variable bindings for the conscell evaluator.

use crate::operators::Builtin;
use conscell_types::{EvalError, EvalResult, Value};
use std::collections::BTreeMap;

/// Flat binding table populated by `define`.
///
/// Operator names and variable names share one namespace; operator names
/// always win and can never be bound here. Bindings live as long as the
/// environment and are copied in and out, so a caller never shares a tree
/// with the table.
///
/// An `Environment` is not synchronized. Evaluators running on several
/// threads against one environment must serialize access to it externally.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: BTreeMap<String, Value>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Fail with `ReservedName` if `name` belongs to a built-in operator.
    pub fn ensure_definable(name: &str) -> EvalResult<()> {
        match Builtin::from_name(name) {
            Some(_) => Err(EvalError::ReservedName(name.to_string())),
            None => Ok(()),
        }
    }

    /// Bind `name` to a copy of `value`, replacing any earlier binding.
    ///
    /// Returns `()`, the result of a `define` form.
    pub fn define(&mut self, name: &str, value: &Value) -> EvalResult<Value> {
        Self::ensure_definable(name)?;
        self.bindings.insert(name.to_string(), value.clone_deep());
        Ok(Value::Empty)
    }

    /// A copy of the value bound to `name`.
    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        self.bindings
            .get(name)
            .map(Value::clone_deep)
            .ok_or_else(|| EvalError::UnboundSymbol(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
