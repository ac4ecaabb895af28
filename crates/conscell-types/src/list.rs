//! Proper-list traversal.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;

static EMPTY: Value = Value::Empty;

/// Borrowing iterator over the elements of a proper list.
///
/// Walking off a `Pair` chain onto anything other than `()` yields a single
/// `Err(MalformedList)` and then ends.
#[derive(Debug, Clone)]
pub struct ListIter<'a> {
    rest: &'a Value,
}

impl<'a> ListIter<'a> {
    pub fn new(list: &'a Value) -> Self {
        Self { rest: list }
    }

    /// The unvisited tail.
    pub fn rest(&self) -> &'a Value {
        self.rest
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = EvalResult<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rest {
            Value::Pair(car, cdr) => {
                self.rest = cdr.as_ref();
                Some(Ok(car.as_ref()))
            }
            Value::Empty => None,
            _ => {
                self.rest = &EMPTY;
                Some(Err(EvalError::MalformedList))
            }
        }
    }
}
