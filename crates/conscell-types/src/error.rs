use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Type,
    Arity,
    Arithmetic,
    Dispatch,
    Binding,
    Structure,
    Output,
}

/// Numeric error code (E100–E799).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Type errors (E100–E199) ──
    pub const TYPE_MISMATCH: Self = Self(100);
    pub const NOT_NUMERIC: Self = Self(101);

    // ── Arity errors (E200–E299) ──
    pub const ARITY_MISMATCH: Self = Self(200);

    // ── Arithmetic errors (E300–E399) ──
    pub const DIVISION_BY_ZERO: Self = Self(300);

    // ── Dispatch errors (E400–E499) ──
    pub const NOT_AN_OPERATOR: Self = Self(400);
    pub const UNKNOWN_OPERATOR: Self = Self(401);

    // ── Binding errors (E500–E599) ──
    pub const UNBOUND_SYMBOL: Self = Self(500);
    pub const RESERVED_NAME: Self = Self(501);

    // ── Structure errors (E600–E699) ──
    pub const MALFORMED_LIST: Self = Self(600);

    // ── Output errors (E700–E799) ──
    pub const OUTPUT_FAILED: Self = Self(700);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Type,
            200..=299 => ErrorCategory::Arity,
            300..=399 => ErrorCategory::Arithmetic,
            400..=499 => ErrorCategory::Dispatch,
            500..=599 => ErrorCategory::Binding,
            600..=699 => ErrorCategory::Structure,
            _ => ErrorCategory::Output,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Arity => write!(f, "arity"),
            Self::Arithmetic => write!(f, "arithmetic"),
            Self::Dispatch => write!(f, "dispatch"),
            Self::Binding => write!(f, "binding"),
            Self::Structure => write!(f, "structure"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Accepted argument counts for an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    /// Inclusive on both ends.
    Range(usize, usize),
    Any,
}

impl Arity {
    /// Whether `n` arguments satisfy this arity.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exactly(k) => n == k,
            Self::AtLeast(k) => n >= k,
            Self::Range(lo, hi) => (lo..=hi).contains(&n),
            Self::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(k) => write!(f, "exactly {k}"),
            Self::AtLeast(k) => write!(f, "at least {k}"),
            Self::Range(lo, hi) => write!(f, "{lo} to {hi}"),
            Self::Any => write!(f, "any number of"),
        }
    }
}

/// Evaluation error. Every variant is recoverable at the top-level call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An operand has the wrong value kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// A numeric operator received a non-number.
    #[error("expected a number, found {0}")]
    NotNumeric(ValueKind),

    #[error("`{operator}` takes {expected} argument(s), received {received}")]
    ArityMismatch {
        operator: String,
        expected: Arity,
        received: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    /// The head of an applied list is not a symbol.
    #[error("cannot apply {0}: the first element of an evaluated list must be an operator symbol")]
    NotAnOperator(ValueKind),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("reference to undefined symbol `{0}`")]
    UnboundSymbol(String),

    /// Attempt to `define` a built-in operator name.
    #[error("built-in operator `{0}` cannot be redefined")]
    ReservedName(String),

    /// A pair chain that does not end in the empty list.
    #[error("malformed list: pair chain does not end in ()")]
    MalformedList,

    /// The `print` operator could not write its output.
    #[error("output failed: {0}")]
    Output(String),
}

impl EvalError {
    /// Stable numeric code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TypeMismatch { .. } => ErrorCode::TYPE_MISMATCH,
            Self::NotNumeric(_) => ErrorCode::NOT_NUMERIC,
            Self::ArityMismatch { .. } => ErrorCode::ARITY_MISMATCH,
            Self::DivisionByZero => ErrorCode::DIVISION_BY_ZERO,
            Self::NotAnOperator(_) => ErrorCode::NOT_AN_OPERATOR,
            Self::UnknownOperator(_) => ErrorCode::UNKNOWN_OPERATOR,
            Self::UnboundSymbol(_) => ErrorCode::UNBOUND_SYMBOL,
            Self::ReservedName(_) => ErrorCode::RESERVED_NAME,
            Self::MalformedList => ErrorCode::MALFORMED_LIST,
            Self::Output(_) => ErrorCode::OUTPUT_FAILED,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
