use crate::stmt::Value;

use std::cmp::Ordering;

/// An element with its evaluated sort keys.
pub(super) struct Keyed {
    pub(super) keys: Vec<Value>,
    pub(super) value: Value,
}

/// Stable sort by the keys, most significant first.
///
/// When every key shares one direction the rows are sorted once by the composite key, reversed
/// for descending. Mixed directions are handled by successive stable sorts from the least
/// significant key to the most significant one.
pub(super) fn sort(mut rows: Vec<Keyed>, descending: &[bool]) -> Vec<Value> {
    let uniform = descending.windows(2).all(|pair| pair[0] == pair[1]);

    if uniform {
        let reverse = descending.first().copied().unwrap_or(false);
        rows.sort_by(|lhs, rhs| directed(compare_keys(&lhs.keys, &rhs.keys), reverse));
    } else {
        for (i, reverse) in descending.iter().enumerate().rev() {
            rows.sort_by(|lhs, rhs| directed(lhs.keys[i].total_cmp(&rhs.keys[i]), *reverse));
        }
    }

    rows.into_iter().map(|row| row.value).collect()
}

fn compare_keys(lhs: &[Value], rhs: &[Value]) -> Ordering {
    lhs.iter()
        .zip(rhs)
        .map(|(lhs, rhs)| lhs.total_cmp(rhs))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse {
        ordering.reverse()
    } else {
        ordering
    }
}
