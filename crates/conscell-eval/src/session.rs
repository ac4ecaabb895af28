//! Batch evaluation of independent top-level expressions.

use crate::config::EvalConfig;
use crate::env::Environment;
use crate::evaluator::Evaluator;
use crate::operators::OperatorTable;
use conscell_types::{ErrorCategory, ErrorCode, EvalError, EvalResult, Value};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};

/// Where `print` output goes.
enum Sink {
    Stdout(io::Stdout),
    Capture(Vec<u8>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(stdout) => stdout,
            Self::Capture(buf) => buf,
        }
    }
}

/// The result of one top-level expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Rendered result value.
    Value { text: String },
    Error {
        code: ErrorCode,
        category: ErrorCategory,
        message: String,
    },
}

impl Outcome {
    fn from_result(result: &EvalResult<Value>) -> Self {
        match result {
            // A malformed result still gets reported, in dotted form.
            Ok(value) => Self::Value {
                text: value.render().unwrap_or_else(|_| value.to_string()),
            },
            Err(err) => Self::from_error(err),
        }
    }

    fn from_error(err: &EvalError) -> Self {
        Self::Error {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Outcomes of a batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub total_errors: usize,
    /// True when `continue_on_error` was off and a failure ended the batch.
    pub stopped_early: bool,
}

impl BatchReport {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Serialize the report to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"outcomes":[],"total_errors":0,"stopped_early":false,"error":"{e}"}}"#)
        })
    }
}

/// An evaluation session: one environment, one output sink, shared by every
/// expression evaluated through it.
///
/// A failed expression leaves the session usable; bindings made before the
/// failure stay in place.
pub struct Session {
    config: EvalConfig,
    table: &'static OperatorTable,
    env: Environment,
    sink: Sink,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        let sink = if config.capture_output {
            Sink::Capture(Vec::new())
        } else {
            Sink::Stdout(io::stdout())
        };
        Self {
            config,
            table: OperatorTable::standard(),
            env: Environment::new(),
            sink,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Evaluate one expression.
    pub fn eval(&mut self, expr: &Value) -> EvalResult<Value> {
        let out = self.sink.writer();
        Evaluator::new(self.table, &mut self.env, out).eval(expr)
    }

    /// Evaluate each expression independently, in order.
    pub fn eval_all(&mut self, exprs: &[Value]) -> BatchReport {
        let mut outcomes = Vec::with_capacity(exprs.len());
        let mut total_errors = 0;
        let mut stopped_early = false;
        for (index, expr) in exprs.iter().enumerate() {
            let result = self.eval(expr);
            let outcome = Outcome::from_result(&result);
            if let Err(err) = &result {
                total_errors += 1;
                tracing::debug!(index, code = %err.code(), "expression failed");
            }
            outcomes.push(outcome);
            if result.is_err() && !self.config.continue_on_error {
                stopped_early = index + 1 < exprs.len();
                break;
            }
        }
        BatchReport {
            outcomes,
            total_errors,
            stopped_early,
        }
    }

    /// Captured `print` output; empty when output goes to stdout.
    pub fn output(&self) -> Cow<'_, str> {
        match &self.sink {
            Sink::Capture(buf) => String::from_utf8_lossy(buf),
            Sink::Stdout(_) => Cow::Borrowed(""),
        }
    }

    /// Take and clear the captured output.
    pub fn take_output(&mut self) -> String {
        match &mut self.sink {
            Sink::Capture(buf) => String::from_utf8_lossy(&std::mem::take(buf)).into_owned(),
            Sink::Stdout(_) => String::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}
