use crate::{
    stmt::{AggregateOp, BinaryOp, UnaryOp, Value},
    Error, Result,
};

use regex::Regex;
use std::{cell::RefCell, cmp::Ordering, collections::HashMap};

/// Compiled patterns, keyed by source text, shared by one evaluation.
#[derive(Debug, Default)]
pub(super) struct Patterns {
    compiled: RefCell<HashMap<String, Regex>>,
}

impl Patterns {
    fn is_match(&self, pattern: &str, haystack: &str) -> Result<bool> {
        if let Some(regex) = self.compiled.borrow().get(pattern) {
            return Ok(regex.is_match(haystack));
        }

        let regex = Regex::new(pattern)?;
        let matched = regex.is_match(haystack);
        self.compiled.borrow_mut().insert(pattern.to_string(), regex);
        Ok(matched)
    }
}

pub(super) fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
        (UnaryOp::Neg, Value::I64(v)) => v
            .checked_neg()
            .map(Value::I64)
            .ok_or_else(|| Error::expression_evaluation_failed("integer overflow in negation")),
        (UnaryOp::Neg, Value::F64(v)) => Ok(Value::F64(-v)),
        (op, value) => Err(Error::expression_evaluation_failed(format!(
            "cannot apply `{op}` to {}",
            value.kind_name()
        ))),
    }
}

/// Applies a non-short-circuiting binary operator.
pub(super) fn binary(patterns: &Patterns, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    use BinaryOp::*;

    let ordered = |lhs: &Value, rhs: &Value, f: fn(Ordering) -> bool| {
        lhs.cmp_ordered(rhs).map(|ordering| Value::Bool(f(ordering)))
    };

    match op {
        Eq => Ok(Value::Bool(lhs.is_eq(&rhs))),
        Ne => Ok(Value::Bool(!lhs.is_eq(&rhs))),
        Ge => ordered(&lhs, &rhs, Ordering::is_ge),
        Gt => ordered(&lhs, &rhs, Ordering::is_gt),
        Le => ordered(&lhs, &rhs, Ordering::is_le),
        Lt => ordered(&lhs, &rhs, Ordering::is_lt),
        Add => add(lhs, rhs),
        Sub => arithmetic(op, lhs, rhs, i64::checked_sub, |lhs, rhs| lhs - rhs),
        Mul => arithmetic(op, lhs, rhs, i64::checked_mul, |lhs, rhs| lhs * rhs),
        Div => divide(lhs, rhs),
        And | Or => {
            let lhs = lhs.to_bool()?;
            let rhs = rhs.to_bool()?;
            Ok(Value::Bool(if op == And { lhs && rhs } else { lhs || rhs }))
        }
        Matches => match (&lhs, &rhs) {
            (Value::String(haystack), Value::String(pattern)) => {
                Ok(Value::Bool(patterns.is_match(pattern, haystack)?))
            }
            _ => Err(mismatch(op, &lhs, &rhs)),
        },
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs, rhs) {
        (Value::String(mut lhs), Value::String(rhs)) => {
            lhs.push_str(&rhs);
            Ok(Value::String(lhs))
        }
        (Value::List(mut lhs), Value::List(rhs)) => {
            lhs.extend(rhs);
            Ok(Value::List(lhs))
        }
        (Value::Mapping(mut lhs), Value::Mapping(rhs)) => {
            lhs.extend(rhs);
            Ok(Value::Mapping(lhs))
        }
        (lhs, rhs) => arithmetic(BinaryOp::Add, lhs, rhs, i64::checked_add, |lhs, rhs| {
            lhs + rhs
        }),
    }
}

fn arithmetic(
    op: BinaryOp,
    lhs: Value,
    rhs: Value,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (&lhs, &rhs) {
        (Value::I64(a), Value::I64(b)) => int(*a, *b).map(Value::I64).ok_or_else(|| {
            Error::expression_evaluation_failed(format!("integer overflow in `{op}`"))
        }),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::F64(float(a, b))),
            _ => Err(mismatch(op, &lhs, &rhs)),
        },
    }
}

fn divide(lhs: Value, rhs: Value) -> Result<Value> {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => {
            Err(Error::expression_evaluation_failed("division by zero"))
        }
        (Some(a), Some(b)) => Ok(Value::F64(a / b)),
        _ => Err(mismatch(BinaryOp::Div, &lhs, &rhs)),
    }
}

fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> Error {
    Error::expression_evaluation_failed(format!(
        "unsupported operand types for `{op}`: {} and {}",
        lhs.kind_name(),
        rhs.kind_name()
    ))
}

/// Reduces a sequence with an aggregate.
pub(super) fn aggregate(
    op: AggregateOp,
    items: impl Iterator<Item = Result<Value>>,
) -> Result<Value> {
    match op {
        AggregateOp::Len => {
            let mut len = 0i64;
            for item in items {
                item?;
                len += 1;
            }
            Ok(Value::I64(len))
        }
        AggregateOp::Sum => items.fold(Ok(Value::I64(0)), |acc, item| add_numbers(acc?, item?)),
        AggregateOp::Min => extreme(items, Ordering::is_lt),
        AggregateOp::Max => extreme(items, Ordering::is_gt),
    }
}

fn add_numbers(acc: Value, item: Value) -> Result<Value> {
    if !item.is_number() {
        return Err(Error::expression_evaluation_failed(format!(
            "cannot sum {}",
            item.kind_name()
        )));
    }
    arithmetic(BinaryOp::Add, acc, item, i64::checked_add, |lhs, rhs| lhs + rhs)
}

/// Keeps the first element for which no later element compares `better`.
fn extreme(
    items: impl Iterator<Item = Result<Value>>,
    better: fn(Ordering) -> bool,
) -> Result<Value> {
    let mut best: Option<Value> = None;
    for item in items {
        let item = item?;
        best = match best {
            Some(current) if !better(item.cmp_ordered(&current)?) => Some(current),
            _ => Some(item),
        };
    }
    Ok(best.unwrap_or(Value::Null))
}
