//! Slicing and indexing over lazily produced sequences.
//!
//! Forward windows stream. Windows anchored at the end of the sequence buffer at most as many
//! elements as the negative bound asks for.

use super::Seq;
use crate::{stmt::Value, Error, Result};

use std::collections::VecDeque;

pub(super) fn slice<'a>(items: Seq<'a>, start: Option<i64>, stop: Option<i64>) -> Result<Seq<'a>> {
    let start = start.unwrap_or(0);

    if start < 0 {
        return from_end(items, start.unsigned_abs() as usize, stop);
    }

    let start = start as usize;
    match stop {
        None => Ok(skip(items, start)),
        Some(stop) if stop >= 0 => {
            let len = (stop as usize).saturating_sub(start);
            Ok(Box::new(skip(items, start).take(len)))
        }
        Some(stop) => Ok(hold_back(skip(items, start), stop.unsigned_abs() as usize)),
    }
}

/// Skips `n` elements, passing errors through.
fn skip(items: Seq<'_>, n: usize) -> Seq<'_> {
    let mut position = 0;
    Box::new(items.filter(move |item| {
        let keep = item.is_err() || position >= n;
        position += 1;
        keep
    }))
}

/// Yields every element except the last `n`.
fn hold_back(items: Seq<'_>, n: usize) -> Seq<'_> {
    let mut pending = VecDeque::with_capacity(n + 1);
    Box::new(items.filter_map(move |item| match item {
        Ok(item) => {
            pending.push_back(item);
            if pending.len() > n {
                pending.pop_front().map(Ok)
            } else {
                None
            }
        }
        Err(err) => Some(Err(err)),
    }))
}

/// `[-k:stop]`: keeps a trailing window of `k` elements, then applies `stop`.
fn from_end<'a>(items: Seq<'a>, k: usize, stop: Option<i64>) -> Result<Seq<'a>> {
    let (window, len) = trailing(items, k)?;
    let first = len - window.len();
    let end = match stop {
        None => len,
        Some(stop) if stop >= 0 => (stop as usize).min(len),
        Some(stop) => len.saturating_sub(stop.unsigned_abs() as usize),
    };

    Ok(Box::new(
        window
            .into_iter()
            .enumerate()
            .filter(move |(i, _)| first + i < end)
            .map(|(_, item)| Ok(item)),
    ))
}

/// Drains `items`, keeping its last `k` elements and counting all of them.
fn trailing(items: Seq<'_>, k: usize) -> Result<(VecDeque<Value>, usize)> {
    let mut window = VecDeque::with_capacity(k);
    let mut len = 0;
    for item in items {
        let item = item?;
        len += 1;
        if k == 0 {
            continue;
        }
        if window.len() == k {
            window.pop_front();
        }
        window.push_back(item);
    }
    Ok((window, len))
}

pub(super) fn index(items: Seq<'_>, index: i64) -> Result<Value> {
    if index >= 0 {
        let mut len = 0;
        for item in items {
            let item = item?;
            if len == index as usize {
                return Ok(item);
            }
            len += 1;
        }
        return Err(Error::index_out_of_range(index, len));
    }

    let k = index.unsigned_abs() as usize;
    let (mut window, len) = trailing(items, k)?;
    if window.len() < k {
        return Err(Error::index_out_of_range(index, len));
    }
    window
        .pop_front()
        .ok_or_else(|| Error::index_out_of_range(index, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: i64) -> Seq<'static> {
        Box::new((0..n).map(|i| Ok(Value::I64(i))))
    }

    fn collect(items: Seq<'_>) -> Vec<i64> {
        items
            .map(|item| match item.unwrap() {
                Value::I64(v) => v,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn slice_matches_std_semantics() {
        let cases: &[(Option<i64>, Option<i64>, &[i64])] = &[
            (None, None, &[0, 1, 2, 3, 4]),
            (Some(1), Some(3), &[1, 2]),
            (Some(3), Some(1), &[]),
            (Some(-2), None, &[3, 4]),
            (Some(-10), Some(2), &[0, 1]),
            (Some(-3), Some(-1), &[2, 3]),
            (Some(1), Some(-1), &[1, 2, 3]),
            (None, Some(-4), &[0]),
            (Some(7), None, &[]),
        ];

        for (start, stop, expected) in cases {
            let actual = collect(slice(seq(5), *start, *stop).unwrap());
            assert_eq!(actual, *expected, "[{start:?}:{stop:?}]");
        }
    }

    #[test]
    fn index_from_either_end() {
        assert_eq!(index(seq(5), 0).unwrap(), Value::I64(0));
        assert_eq!(index(seq(5), -1).unwrap(), Value::I64(4));
        assert_eq!(index(seq(5), -5).unwrap(), Value::I64(0));
        assert!(index(seq(5), 5).unwrap_err().is_index_out_of_range());
        assert!(index(seq(5), -6).unwrap_err().is_index_out_of_range());
        assert!(index(seq(0), -1).unwrap_err().is_index_out_of_range());
    }

    #[test]
    fn forward_slice_stops_pulling() {
        let items: Seq<'static> = Box::new((0..).map(|i| Ok(Value::I64(i))));
        assert_eq!(collect(slice(items, Some(2), Some(4)).unwrap()), vec![2, 3]);
    }
}
