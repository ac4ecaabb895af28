//! The Value tree and its per-kind behavior.

use crate::error::{EvalError, EvalResult};
use crate::list::ListIter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// The five value kinds, used for dispatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Real,
    Symbol,
    Pair,
    Empty,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::Symbol => write!(f, "symbol"),
            Self::Pair => write!(f, "pair"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// A node of the expression tree.
///
/// Each `Pair` exclusively owns both children, so a tree never contains
/// cycles and dropping the root frees the whole structure. Values are never
/// mutated in place; operators build new ones.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` walk the `cdr` spine in a loop,
/// so only `car` nesting consumes stack.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int(i64),
    Real(f64),
    Symbol(String),
    Pair(Box<Value>, Box<Value>),
    /// The empty list, `()`.
    Empty,
}

impl Value {
    // ── Construction ─────────────────────────────────────────────────────

    pub fn int(n: i64) -> Self {
        Self::Int(n)
    }

    pub fn real(x: f64) -> Self {
        Self::Real(x)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn cons(car: Value, cdr: Value) -> Self {
        Self::Pair(Box::new(car), Box::new(cdr))
    }

    /// Build a proper list from `items`.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Self::Empty, |tail, head| Self::cons(head, tail))
    }

    /// `Int(1)` for true, `Int(0)` for false.
    pub fn truth(b: bool) -> Self {
        Self::Int(i64::from(b))
    }

    // ── Classification & access ──────────────────────────────────────────

    pub fn classify(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Real(_) => ValueKind::Real,
            Self::Symbol(_) => ValueKind::Symbol,
            Self::Pair(..) => ValueKind::Pair,
            Self::Empty => ValueKind::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True for `Pair` and `Empty`: anything that may head a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Pair(..) | Self::Empty)
    }

    fn mismatch(&self, expected: ValueKind) -> EvalError {
        EvalError::TypeMismatch {
            expected,
            found: self.classify(),
        }
    }

    pub fn as_int(&self) -> EvalResult<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            other => Err(other.mismatch(ValueKind::Int)),
        }
    }

    pub fn as_real(&self) -> EvalResult<f64> {
        match self {
            Self::Real(x) => Ok(*x),
            other => Err(other.mismatch(ValueKind::Real)),
        }
    }

    pub fn as_symbol(&self) -> EvalResult<&str> {
        match self {
            Self::Symbol(s) => Ok(s.as_str()),
            other => Err(other.mismatch(ValueKind::Symbol)),
        }
    }

    pub fn as_car(&self) -> EvalResult<&Value> {
        match self {
            Self::Pair(car, _) => Ok(car.as_ref()),
            other => Err(other.mismatch(ValueKind::Pair)),
        }
    }

    pub fn as_cdr(&self) -> EvalResult<&Value> {
        match self {
            Self::Pair(_, cdr) => Ok(cdr.as_ref()),
            other => Err(other.mismatch(ValueKind::Pair)),
        }
    }

    /// Structural copy. Bindings are stored and handed out through this so
    /// that no two owners ever share a tree.
    pub fn clone_deep(&self) -> Self {
        let mut heads = Vec::new();
        let mut rest = self;
        while let Self::Pair(car, cdr) = rest {
            heads.push(car.clone_deep());
            rest = cdr.as_ref();
        }
        let tail = match rest {
            Self::Int(n) => Self::Int(*n),
            Self::Real(x) => Self::Real(*x),
            Self::Symbol(s) => Self::Symbol(s.clone()),
            // The loop above consumed every pair.
            Self::Empty | Self::Pair(..) => Self::Empty,
        };
        heads
            .into_iter()
            .rev()
            .fold(tail, |tail, head| Self::cons(head, tail))
    }

    /// Move the contents out, leaving `()` behind.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    // ── Lists ────────────────────────────────────────────────────────────

    /// Iterate the elements of a proper list.
    ///
    /// Yields `MalformedList` once if the chain ends in anything but `()`.
    pub fn list_iter(&self) -> ListIter<'_> {
        ListIter::new(self)
    }

    /// Number of elements in a proper list.
    pub fn list_len(&self) -> EvalResult<usize> {
        self.list_iter()
            .try_fold(0, |n, item| item.map(|_| n + 1))
    }

    // ── Numeric behavior ─────────────────────────────────────────────────

    fn numeric(&self) -> EvalResult<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(x) => Ok(*x),
            other => Err(EvalError::NotNumeric(other.classify())),
        }
    }

    /// One step of the `+`/`-` fold.
    pub fn accumulate_sum(&self, fold: &mut NumericFold) -> EvalResult<()> {
        match self {
            Self::Int(n) => fold.total += *n as f64,
            Self::Real(x) => {
                fold.is_int = false;
                fold.total += x;
            }
            other => return Err(EvalError::NotNumeric(other.classify())),
        }
        Ok(())
    }

    /// One step of the `*`/`/` fold.
    pub fn accumulate_product(&self, fold: &mut NumericFold) -> EvalResult<()> {
        match self {
            Self::Int(n) => fold.total *= *n as f64,
            Self::Real(x) => {
                fold.is_int = false;
                fold.total *= x;
            }
            other => return Err(EvalError::NotNumeric(other.classify())),
        }
        Ok(())
    }

    /// One step of a `<` chain.
    pub fn compare_chain_step(&self, chain: &mut LessChain) -> EvalResult<()> {
        let this = self.numeric()?;
        if let Some(last) = chain.last {
            chain.holds &= last < this;
        }
        chain.last = Some(this);
        Ok(())
    }

    pub fn ceiling(&self) -> EvalResult<Value> {
        match self {
            Self::Int(n) => Ok(Self::Int(*n)),
            Self::Real(x) => Ok(Self::Int(x.ceil() as i64)),
            other => Err(EvalError::NotNumeric(other.classify())),
        }
    }

    pub fn floor(&self) -> EvalResult<Value> {
        match self {
            Self::Int(n) => Ok(Self::Int(*n)),
            Self::Real(x) => Ok(Self::Int(x.floor() as i64)),
            other => Err(EvalError::NotNumeric(other.classify())),
        }
    }

    /// Only numeric zero is false; `()` and symbols are true.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Int(n) => *n == 0,
            Self::Real(x) => *x == 0.0,
            Self::Symbol(_) | Self::Pair(..) | Self::Empty => false,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Canonical textual form. Fails on a malformed list anywhere in the tree.
    pub fn render(&self) -> EvalResult<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Stream the canonical textual form into `out`.
    pub fn write_to<W: fmt::Write>(&self, out: &mut W) -> EvalResult<()> {
        match self {
            Self::Int(n) => write!(out, "{n}").map_err(formatter_failed),
            Self::Real(x) => write!(out, "{x}").map_err(formatter_failed),
            Self::Symbol(s) => out.write_str(s).map_err(formatter_failed),
            Self::Empty => out.write_str("()").map_err(formatter_failed),
            Self::Pair(..) => {
                out.write_char('(').map_err(formatter_failed)?;
                for (i, item) in self.list_iter().enumerate() {
                    let item = item?;
                    if i > 0 {
                        out.write_char(' ').map_err(formatter_failed)?;
                    }
                    item.write_to(out)?;
                }
                out.write_char(')').map_err(formatter_failed)
            }
        }
    }
}

fn formatter_failed(_: fmt::Error) -> EvalError {
    EvalError::Output("formatter error".into())
}

/// Lenient diagnostic form: malformed tails print in dotted notation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Empty => f.write_str("()"),
            Self::Pair(car, cdr) => {
                write!(f, "({car}")?;
                let mut rest: &Value = cdr.as_ref();
                loop {
                    match rest {
                        Self::Pair(car, cdr) => {
                            write!(f, " {car}")?;
                            rest = cdr.as_ref();
                        }
                        Self::Empty => break,
                        tail => {
                            write!(f, " . {tail}")?;
                            break;
                        }
                    }
                }
                f.write_str(")")
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Empty
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        self.clone_deep()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            match (a, b) {
                (Self::Pair(a_car, a_cdr), Self::Pair(b_car, b_cdr)) => {
                    if a_car != b_car {
                        return false;
                    }
                    a = a_cdr.as_ref();
                    b = b_cdr.as_ref();
                }
                (Self::Int(x), Self::Int(y)) => return x == y,
                (Self::Real(x), Self::Real(y)) => return x == y,
                (Self::Symbol(x), Self::Symbol(y)) => return x == y,
                (Self::Empty, Self::Empty) => return true,
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open = 0usize;
        let mut rest = self;
        while let Self::Pair(car, cdr) = rest {
            write!(f, "Pair({car:?}, ")?;
            open += 1;
            rest = cdr.as_ref();
        }
        match rest {
            Self::Int(n) => write!(f, "Int({n:?})")?,
            Self::Real(x) => write!(f, "Real({x:?})")?,
            Self::Symbol(s) => write!(f, "Symbol({s:?})")?,
            Self::Empty | Self::Pair(..) => f.write_str("Empty")?,
        }
        for _ in 0..open {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut rest = match self {
            Self::Pair(_, cdr) => mem::take(&mut **cdr),
            _ => return,
        };
        // Each node is dropped with an empty cdr, so no drop recurses down the spine.
        while let Self::Pair(_, cdr) = &mut rest {
            let next = mem::take(&mut **cdr);
            rest = next;
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Real(x)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::list(iter)
    }
}

/// Running state of an arithmetic fold.
///
/// `is_int` stays true only while every operand seen so far is an `Int`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericFold {
    pub is_int: bool,
    pub total: f64,
}

impl NumericFold {
    /// Identity for addition.
    pub fn sum() -> Self {
        Self {
            is_int: true,
            total: 0.0,
        }
    }

    /// Identity for multiplication.
    pub fn product() -> Self {
        Self {
            is_int: true,
            total: 1.0,
        }
    }

    /// Integer results truncate toward zero.
    pub fn finish(self) -> Value {
        if self.is_int {
            Value::Int(self.total as i64)
        } else {
            Value::Real(self.total)
        }
    }
}

/// Running state of a strictly-increasing chain test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessChain {
    holds: bool,
    last: Option<f64>,
}

impl LessChain {
    pub fn new() -> Self {
        Self {
            holds: true,
            last: None,
        }
    }

    /// Whether every step so far was strictly increasing.
    pub fn holds(&self) -> bool {
        self.holds
    }
}
