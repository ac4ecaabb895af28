//! Shared types for the conscell evaluator.
//!
//! This crate defines the `Value` tree (integers, reals, symbols, pairs and
//! the empty list), the per-kind behavior the evaluator builds on, proper
//! list traversal, and the structured error type with its stable codes.

mod error;
mod list;
mod value;

pub use error::{Arity, ErrorCategory, ErrorCode, EvalError, EvalResult};
pub use list::ListIter;
pub use value::{LessChain, NumericFold, Value, ValueKind};
