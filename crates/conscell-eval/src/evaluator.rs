//! Core expression evaluator.

use crate::env::Environment;
use crate::operators::OperatorTable;
use conscell_types::{EvalError, EvalResult, Value};
use std::fmt;
use std::io::{self, Write};

/// The core evaluator: walks a Value tree and produces a new Value.
///
/// Borrows the operator table, the environment that `define` writes to, and
/// the sink that `print` writes to. Recursion depth follows the nesting depth
/// of the expression; there is no depth bound.
pub struct Evaluator<'a> {
    table: &'a OperatorTable,
    env: &'a mut Environment,
    out: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        table: &'a OperatorTable,
        env: &'a mut Environment,
        out: &'a mut dyn Write,
    ) -> Self {
        Self { table, env, out }
    }

    /// Evaluate an expression.
    ///
    /// - a non-empty list applies the operator named by its head,
    /// - a symbol resolves through the environment,
    /// - numbers and `()` evaluate to a copy of themselves.
    pub fn eval(&mut self, expr: &Value) -> EvalResult<Value> {
        match expr {
            Value::Pair(head, args) => self.apply(head, args),
            Value::Symbol(name) => self.env.lookup(name).inspect_err(|_| {
                tracing::debug!(symbol = name.as_str(), "unbound symbol");
            }),
            Value::Int(_) | Value::Real(_) | Value::Empty => Ok(expr.clone_deep()),
        }
    }

    fn apply(&mut self, head: &Value, args: &Value) -> EvalResult<Value> {
        let name = match head {
            Value::Symbol(name) => name,
            other => return Err(EvalError::NotAnOperator(other.classify())),
        };
        let table = self.table;
        let op = table
            .get(name)
            .ok_or_else(|| EvalError::UnknownOperator(name.clone()))?;
        let args = op.collect_args(args)?;
        tracing::trace!(operator = name.as_str(), argc = args.len(), "dispatch");
        (op.handler)(self, &args)
    }

    pub fn env(&self) -> &Environment {
        &*self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut *self.env
    }

    /// Write one line of `print` output.
    pub fn emit_line(&mut self, text: &str) -> EvalResult<()> {
        writeln!(self.out, "{text}").map_err(|e| EvalError::Output(e.to_string()))
    }
}

impl fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// Evaluate `expr` against `env` with the standard operator table, sending
/// `print` output to stdout.
pub fn evaluate(expr: &Value, env: &mut Environment) -> EvalResult<Value> {
    let mut stdout = io::stdout();
    Evaluator::new(OperatorTable::standard(), env, &mut stdout).eval(expr)
}
