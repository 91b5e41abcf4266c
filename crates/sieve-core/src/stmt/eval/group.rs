//! Membership and grouping keyed by value equality.
//!
//! Both structures hash scalar keys. The first unhashable key (a list, a mapping or NaN)
//! switches them to linear scans for the rest of the sequence.

use crate::stmt::{HashKey, Value};

use std::collections::{HashMap, HashSet};
use tracing::trace;

#[derive(Debug)]
pub(super) struct Seen {
    hashed: Option<HashSet<HashKey>>,
    values: Vec<Value>,
}

impl Seen {
    pub(super) fn new() -> Seen {
        Seen {
            hashed: Some(HashSet::new()),
            values: vec![],
        }
    }

    /// Records `value`, returning `true` if it had not been seen yet.
    pub(super) fn insert(&mut self, value: &Value) -> bool {
        let key = value.hash_key();

        if let (Some(hashed), Some(key)) = (&mut self.hashed, &key) {
            if !hashed.insert(key.clone()) {
                return false;
            }
        } else {
            if self.hashed.take().is_some() {
                trace!(kind = value.kind_name(), "distinct switched to linear scan");
            }
            if self.values.iter().any(|seen| seen.is_eq(value)) {
                return false;
            }
        }

        self.values.push(value.clone());
        true
    }
}

#[derive(Debug)]
pub(super) struct Groups {
    index: Option<HashMap<HashKey, usize>>,
    groups: Vec<(Value, Vec<Value>)>,
}

impl Groups {
    pub(super) fn new() -> Groups {
        Groups {
            index: Some(HashMap::new()),
            groups: vec![],
        }
    }

    pub(super) fn insert(&mut self, key: Value, element: Value) {
        let position = match (&mut self.index, key.hash_key()) {
            (Some(index), Some(hash_key)) => *index.entry(hash_key).or_insert(self.groups.len()),
            _ => {
                if self.index.take().is_some() {
                    trace!(kind = key.kind_name(), "groupby switched to linear scan");
                }
                self.groups
                    .iter()
                    .position(|(existing, _)| existing.is_eq(&key))
                    .unwrap_or(self.groups.len())
            }
        };

        match self.groups.get_mut(position) {
            Some((_, members)) => members.push(element),
            None => self.groups.push((key, vec![element])),
        }
    }

    /// Groups in order of first occurrence.
    pub(super) fn into_groups(self) -> Vec<(Value, Vec<Value>)> {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_degrades_without_losing_history() {
        let mut seen = Seen::new();
        assert!(seen.insert(&Value::I64(1)));
        assert!(!seen.insert(&Value::F64(1.0)));
        assert!(seen.insert(&Value::from(vec![1])));
        assert!(!seen.insert(&Value::I64(1)));
        assert!(!seen.insert(&Value::from(vec![1])));
        assert!(seen.insert(&Value::from("x")));
    }

    #[test]
    fn seen_agrees_with_equality_for_large_numbers() {
        let big = 10_i64.pow(16);
        let mut seen = Seen::new();
        assert!(seen.insert(&Value::I64(big)));
        assert!(!seen.insert(&Value::F64(1e16)));
        assert!(seen.insert(&Value::I64(big + 1)));
    }

    #[test]
    fn groups_keep_first_occurrence_order() {
        let mut groups = Groups::new();
        groups.insert(Value::from("b"), Value::I64(1));
        groups.insert(Value::from("a"), Value::I64(2));
        groups.insert(Value::mapping([("k", 1)]), Value::I64(3));
        groups.insert(Value::from("b"), Value::I64(4));
        groups.insert(Value::mapping([("k", 1)]), Value::I64(5));

        let groups = groups.into_groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], (Value::from("b"), vec![Value::I64(1), Value::I64(4)]));
        assert_eq!(groups[1], (Value::from("a"), vec![Value::I64(2)]));
        assert_eq!(
            groups[2],
            (Value::mapping([("k", 1)]), vec![Value::I64(3), Value::I64(5)])
        );
    }
}
