//! conscell tree-walking evaluator.
//!
//! Evaluates `Value` trees built by an external reader: arithmetic,
//! comparison, conditionals, quoting, pair construction and destructuring,
//! `define` bindings, printing and `eval`.
//!
//! Evaluation is single-threaded. Every failure is returned as an
//! [`EvalError`] from the top-level call; only call-stack exhaustion on a
//! deeply nested expression is fatal.

mod config;
mod env;
mod evaluator;
mod operators;
mod session;

pub use config::{ConfigError, EvalConfig};
pub use conscell_types::{
    Arity, ErrorCategory, ErrorCode, EvalError, EvalResult, Value, ValueKind,
};
pub use env::Environment;
pub use evaluator::{evaluate, Evaluator};
pub use operators::{Builtin, Handler, Operator, OperatorTable};
pub use session::{BatchReport, Outcome, Session};
