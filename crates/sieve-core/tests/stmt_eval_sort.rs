use proptest::prelude::*;
use sieve_core::stmt::{ctx, Request, SortKey, Value};

use std::cmp::Ordering;

const FIELDS: [&str; 3] = ["a", "b", "c"];

fn row(values: &[i64]) -> Value {
    Value::mapping(FIELDS.iter().copied().zip(values.iter().copied()))
}

/// Sorts with a single comparator over all keys.
fn reference(rows: &[Vec<i64>], descending: &[bool]) -> Vec<Value> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|lhs, rhs| {
        descending
            .iter()
            .enumerate()
            .map(|(i, desc)| {
                let ordering = lhs[i].cmp(&rhs[i]);
                if *desc {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    sorted.iter().map(|values| row(values)).collect()
}

fn sort_request(rows: &[Vec<i64>], descending: &[bool]) -> Request {
    let data = Request::literal(Value::from(
        rows.iter().map(|values| row(values)).collect::<Vec<_>>(),
    ));
    data.sort(descending.iter().enumerate().map(|(i, desc)| {
        let key = ctx().attr(FIELDS[i]);
        if *desc {
            SortKey::desc(key)
        } else {
            SortKey::asc(key)
        }
    }))
}

proptest! {
    #[test]
    fn sort_agrees_with_composite_key(
        rows in prop::collection::vec(prop::collection::vec(0i64..3, 3), 0..40),
        descending in prop::collection::vec(any::<bool>(), 1..=3),
    ) {
        let sorted = sort_request(&rows, &descending).eval_const().unwrap();
        prop_assert_eq!(sorted, Value::from(reference(&rows, &descending)));
    }
}

#[test]
fn sort_is_stable() {
    let rows = Request::literal(Value::from(vec![
        Value::mapping([("k", Value::I64(1)), ("n", Value::from("first"))]),
        Value::mapping([("k", Value::I64(0)), ("n", Value::from("second"))]),
        Value::mapping([("k", Value::I64(1)), ("n", Value::from("third"))]),
    ]));
    let request = rows.sort([SortKey::desc(ctx().attr("k"))]).map(ctx().attr("n"));
    assert_eq!(
        request.eval_const().unwrap(),
        Value::from(vec!["first", "third", "second"])
    );
}

#[test]
fn null_sorts_first() {
    let values = Request::literal(Value::from(vec![
        Value::I64(2),
        Value::Null,
        Value::I64(1),
    ]));
    assert_eq!(
        values.sort_by(ctx()).eval_const().unwrap(),
        Value::from(vec![Value::Null, Value::I64(1), Value::I64(2)])
    );
}
