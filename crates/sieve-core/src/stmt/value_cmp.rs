//! Equality and ordering between values.
//!
//! Three relations are defined here:
//! - `Value::is_eq`: the equality used by `==`, where `1` and `1.0` are equal
//! - `Value::cmp_ordered`: the ordering used by `<` and friends, failing on incompatible kinds
//! - `Value::total_cmp`: a total order over every value, used for sorting

use super::Value;
use crate::{Error, Result};

use std::cmp::Ordering;

/// The integer an integral float stands for exactly, if any.
pub(super) fn exact_i64(value: f64) -> Option<i64> {
    // 2^63, the first float past `i64::MAX`
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value)).then(|| value as i64)
}

impl Value {
    /// Equality as seen by the `==` operator.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::I64(lhs), Value::F64(rhs)) | (Value::F64(rhs), Value::I64(lhs)) => {
                exact_i64(*rhs) == Some(*lhs)
            }
            (Value::List(lhs), Value::List(rhs)) => {
                lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(lhs, rhs)| lhs.is_eq(rhs))
            }
            (Value::Mapping(lhs), Value::Mapping(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs
                        .iter()
                        .all(|(name, lhs)| rhs.get(name).is_some_and(|rhs| lhs.is_eq(rhs)))
            }
            _ => self == other,
        }
    }

    /// Ordering as seen by `<`, `<=`, `>`, `>=`, `min` and `max`.
    ///
    /// Numbers compare with numbers, strings with strings, booleans with booleans, and lists
    /// lexicographically. Every other pairing is an evaluation error.
    pub fn cmp_ordered(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Bool(lhs), Value::Bool(rhs)) => Ok(lhs.cmp(rhs)),
            (Value::I64(lhs), Value::I64(rhs)) => Ok(lhs.cmp(rhs)),
            (Value::String(lhs), Value::String(rhs)) => Ok(lhs.cmp(rhs)),
            (lhs, rhs) if lhs.is_number() && rhs.is_number() => {
                let lhs = lhs.as_f64().unwrap_or(f64::NAN);
                let rhs = rhs.as_f64().unwrap_or(f64::NAN);
                lhs.partial_cmp(&rhs).ok_or_else(|| {
                    Error::expression_evaluation_failed("cannot order NaN")
                })
            }
            (Value::List(lhs), Value::List(rhs)) => {
                for (lhs, rhs) in lhs.iter().zip(rhs) {
                    match lhs.cmp_ordered(rhs)? {
                        Ordering::Equal => {}
                        ordering => return Ok(ordering),
                    }
                }
                Ok(lhs.len().cmp(&rhs.len()))
            }
            (lhs, rhs) => Err(Error::expression_evaluation_failed(format!(
                "cannot order {} against {}",
                lhs.kind_name(),
                rhs.kind_name()
            ))),
        }
    }

    /// A total order over all values.
    ///
    /// Kinds rank `null < bool < number < string < list < mapping`. Within a kind values compare
    /// naturally; floats use IEEE total ordering so NaN sorts after every other number.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs.cmp(rhs),
            (Value::I64(lhs), Value::I64(rhs)) => lhs.cmp(rhs),
            (Value::String(lhs), Value::String(rhs)) => lhs.cmp(rhs),
            (lhs, rhs) if lhs.is_number() && rhs.is_number() => {
                let lhs = lhs.as_f64().unwrap_or(f64::NAN);
                let rhs = rhs.as_f64().unwrap_or(f64::NAN);
                lhs.total_cmp(&rhs)
            }
            (Value::List(lhs), Value::List(rhs)) => lhs
                .iter()
                .zip(rhs)
                .map(|(lhs, rhs)| lhs.total_cmp(rhs))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| lhs.len().cmp(&rhs.len())),
            (Value::Mapping(lhs), Value::Mapping(rhs)) => lhs
                .iter()
                .zip(rhs)
                .map(|((lhs_name, lhs), (rhs_name, rhs))| {
                    lhs_name.cmp(rhs_name).then_with(|| lhs.total_cmp(rhs))
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| lhs.len().cmp(&rhs.len())),
            (lhs, rhs) => lhs.kind_rank().cmp(&rhs.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::I64(_) | Value::F64(_) => 2,
            Value::String(_) => 3,
            Value::List(_) => 4,
            Value::Mapping(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numbers_are_equal() {
        assert!(Value::I64(1).is_eq(&Value::F64(1.0)));
        assert!(!Value::I64(1).is_eq(&Value::F64(1.5)));
        assert!(Value::from(vec![1, 2]).is_eq(&Value::List(vec![
            Value::F64(1.0),
            Value::I64(2)
        ])));
    }

    #[test]
    fn large_mixed_numbers_compare_exactly() {
        let big = 10_i64.pow(16);
        assert!(Value::I64(big).is_eq(&Value::F64(1e16)));
        assert!(!Value::I64(big + 1).is_eq(&Value::F64(1e16)));
        assert!(!Value::I64(i64::MAX).is_eq(&Value::F64(9.3e18)));
    }

    #[test]
    fn ordered_comparison_rejects_mixed_kinds() {
        let err = Value::from("a").cmp_ordered(&Value::I64(1)).unwrap_err();
        assert!(err.is_expression_evaluation_failed());
        assert!(Value::Null.cmp_ordered(&Value::Null).is_err());
    }

    #[test]
    fn total_order_ranks_kinds() {
        let mut values = vec![
            Value::from("b"),
            Value::I64(3),
            Value::Null,
            Value::F64(1.5),
            Value::Bool(true),
            Value::from(vec![1]),
        ];
        values.sort_by(Value::total_cmp);

        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::F64(1.5),
                Value::I64(3),
                Value::from("b"),
                Value::from(vec![1]),
            ]
        );
    }

    #[test]
    fn total_order_places_nan_last() {
        let nan = Value::F64(f64::NAN);
        assert_eq!(nan.total_cmp(&Value::I64(i64::MAX)), Ordering::Greater);
    }
}
