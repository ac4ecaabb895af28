//! Built-in operators and the table that dispatches them.
//!
//! Every operator receives its arguments unevaluated and decides for itself
//! which of them to evaluate, and in what order.

use crate::env::Environment;
use crate::evaluator::Evaluator;
use conscell_types::{Arity, EvalError, EvalResult, LessChain, NumericFold, Value, ValueKind};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Handler signature: the evaluator and the unevaluated arguments, already
/// checked against the operator's arity.
pub type Handler = fn(&mut Evaluator<'_>, &[&Value]) -> EvalResult<Value>;

/// The closed set of built-in operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Add,
    Sub,
    Mul,
    Div,
    Ceiling,
    Floor,
    Less,
    Not,
    If,
    Quote,
    Cons,
    Car,
    Cdr,
    Nullp,
    Define,
    Print,
    Eval,
}

impl Builtin {
    pub const ALL: [Builtin; 17] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Ceiling,
        Self::Floor,
        Self::Less,
        Self::Not,
        Self::If,
        Self::Quote,
        Self::Cons,
        Self::Car,
        Self::Cdr,
        Self::Nullp,
        Self::Define,
        Self::Print,
        Self::Eval,
    ];

    /// The symbol that names this operator.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::Less => "<",
            Self::Not => "not",
            Self::If => "if",
            Self::Quote => "quote",
            Self::Cons => "cons",
            Self::Car => "car",
            Self::Cdr => "cdr",
            Self::Nullp => "nullp",
            Self::Define => "define",
            Self::Print => "print",
            Self::Eval => "eval",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::Add | Self::Mul | Self::Less => Arity::Any,
            Self::Sub | Self::Div => Arity::AtLeast(2),
            Self::If => Arity::Range(2, 3),
            Self::Cons | Self::Define => Arity::Exactly(2),
            Self::Ceiling
            | Self::Floor
            | Self::Not
            | Self::Quote
            | Self::Car
            | Self::Cdr
            | Self::Nullp
            | Self::Print
            | Self::Eval => Arity::Exactly(1),
        }
    }

    fn handler(self) -> Handler {
        match self {
            Self::Add => eval_add,
            Self::Sub => eval_sub,
            Self::Mul => eval_mul,
            Self::Div => eval_div,
            Self::Ceiling => eval_ceiling,
            Self::Floor => eval_floor,
            Self::Less => eval_less,
            Self::Not => eval_not,
            Self::If => eval_if,
            Self::Quote => eval_quote,
            Self::Cons => eval_cons,
            Self::Car => eval_car,
            Self::Cdr => eval_cdr,
            Self::Nullp => eval_nullp,
            Self::Define => eval_define,
            Self::Print => eval_print,
            Self::Eval => eval_eval,
        }
    }
}

/// One entry of the operator table.
#[derive(Clone, Copy)]
pub struct Operator {
    pub builtin: Builtin,
    pub arity: Arity,
    pub handler: Handler,
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("builtin", &self.builtin)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Operator {
    /// Split an argument list into its elements and check the count.
    ///
    /// Nothing is evaluated here, so an arity failure has no side effects.
    pub fn collect_args<'v>(&self, args: &'v Value) -> EvalResult<Vec<&'v Value>> {
        let args = args.list_iter().collect::<EvalResult<Vec<_>>>()?;
        if self.arity.accepts(args.len()) {
            Ok(args)
        } else {
            Err(EvalError::ArityMismatch {
                operator: self.builtin.name().to_string(),
                expected: self.arity,
                received: args.len(),
            })
        }
    }
}

/// Immutable mapping from operator symbol to handler.
#[derive(Debug, Clone)]
pub struct OperatorTable {
    entries: BTreeMap<&'static str, Operator>,
}

impl OperatorTable {
    /// Build a table holding every built-in.
    pub fn new() -> Self {
        let entries = Builtin::ALL
            .into_iter()
            .map(|builtin| {
                (
                    builtin.name(),
                    Operator {
                        builtin,
                        arity: builtin.arity(),
                        handler: builtin.handler(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// The process-wide table, built on first use.
    pub fn standard() -> &'static OperatorTable {
        static TABLE: OnceLock<OperatorTable> = OnceLock::new();
        TABLE.get_or_init(OperatorTable::new)
    }

    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Operator names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Arithmetic ───────────────────────────────────────────────────────────

fn eval_add(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let mut fold = NumericFold::sum();
    for arg in args {
        ev.eval(arg)?.accumulate_sum(&mut fold)?;
    }
    Ok(fold.finish())
}

/// `a - b - c` is computed as `-((-a) + b + c)`.
fn eval_sub(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let mut fold = NumericFold::sum();
    ev.eval(args[0])?.accumulate_sum(&mut fold)?;
    fold.total = -fold.total;
    for arg in &args[1..] {
        ev.eval(arg)?.accumulate_sum(&mut fold)?;
    }
    fold.total = -fold.total;
    Ok(fold.finish())
}

/// Multiply `args` into `fold`, stopping at the first zero product.
///
/// Operands after the zero are not evaluated.
fn multiply_into(
    ev: &mut Evaluator<'_>,
    args: &[&Value],
    fold: &mut NumericFold,
) -> EvalResult<()> {
    for arg in args {
        ev.eval(arg)?.accumulate_product(fold)?;
        if fold.total == 0.0 {
            break;
        }
    }
    Ok(())
}

fn eval_mul(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let mut fold = NumericFold::product();
    multiply_into(ev, args, &mut fold)?;
    Ok(fold.finish())
}

/// `a / b / c` is computed as `a / (b * c)`.
fn eval_div(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let mut dividend = NumericFold::product();
    ev.eval(args[0])?.accumulate_product(&mut dividend)?;
    let mut divisor = NumericFold::product();
    multiply_into(ev, &args[1..], &mut divisor)?;
    if divisor.total == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(NumericFold {
        is_int: dividend.is_int && divisor.is_int,
        total: dividend.total / divisor.total,
    }
    .finish())
}

fn eval_ceiling(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    ev.eval(args[0])?.ceiling()
}

fn eval_floor(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    ev.eval(args[0])?.floor()
}

// ── Logic ────────────────────────────────────────────────────────────────

fn eval_less(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let mut chain = LessChain::new();
    for arg in args {
        ev.eval(arg)?.compare_chain_step(&mut chain)?;
        if !chain.holds() {
            break;
        }
    }
    Ok(Value::truth(chain.holds()))
}

fn eval_not(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    Ok(Value::truth(ev.eval(args[0])?.is_falsy()))
}

fn eval_if(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    if !ev.eval(args[0])?.is_falsy() {
        ev.eval(args[1])
    } else if let Some(alternative) = args.get(2) {
        ev.eval(alternative)
    } else {
        Ok(Value::Empty)
    }
}

// ── Lists ────────────────────────────────────────────────────────────────

fn eval_quote(_ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    Ok(args[0].clone_deep())
}

fn eval_cons(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let tail = ev.eval(args[1])?;
    if !tail.is_list() {
        return Err(EvalError::TypeMismatch {
            expected: ValueKind::Pair,
            found: tail.classify(),
        });
    }
    let head = ev.eval(args[0])?;
    Ok(Value::cons(head, tail))
}

/// Evaluate `arg` to a non-empty proper list and split it.
fn eval_non_empty_list(ev: &mut Evaluator<'_>, arg: &Value) -> EvalResult<(Value, Value)> {
    let mut list = ev.eval(arg)?;
    match &mut list {
        Value::Pair(car, cdr) => {
            cdr.list_len()?;
            Ok((car.take(), cdr.take()))
        }
        other => Err(EvalError::TypeMismatch {
            expected: ValueKind::Pair,
            found: other.classify(),
        }),
    }
}

fn eval_car(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    eval_non_empty_list(ev, args[0]).map(|(car, _)| car)
}

fn eval_cdr(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    eval_non_empty_list(ev, args[0]).map(|(_, cdr)| cdr)
}

fn eval_nullp(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    Ok(Value::truth(ev.eval(args[0])?.is_empty()))
}

// ── Bindings & effects ───────────────────────────────────────────────────

fn eval_define(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let name = args[0].as_symbol()?;
    Environment::ensure_definable(name)?;
    let value = ev.eval(args[1])?;
    tracing::debug!(symbol = name, "define");
    ev.env_mut().define(name, &value)
}

fn eval_print(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let text = ev.eval(args[0])?.render()?;
    ev.emit_line(&text)?;
    Ok(Value::Empty)
}

/// Evaluate the argument, then evaluate the result again.
fn eval_eval(ev: &mut Evaluator<'_>, args: &[&Value]) -> EvalResult<Value> {
    let code = ev.eval(args[0])?;
    ev.eval(&code)
}
