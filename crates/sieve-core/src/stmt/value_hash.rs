use super::{value_cmp::exact_i64, Value};

/// Hashable projection of a scalar value.
///
/// Keys agree with `Value::is_eq`: an integral float hashes like the matching integer. Lists,
/// mappings and NaN have no key; grouping and de-duplication fall back to linear scans for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    I64(i64),
    F64(u64),
    String(String),
}

impl Value {
    /// Returns the value's hash key, or `None` when the value is unhashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        Some(match self {
            Value::Null => HashKey::Null,
            Value::Bool(v) => HashKey::Bool(*v),
            Value::I64(v) => HashKey::I64(*v),
            Value::F64(v) if v.is_nan() => return None,
            Value::F64(v) => match exact_i64(*v) {
                Some(v) => HashKey::I64(v),
                None => HashKey::F64(v.to_bits()),
            },
            Value::String(v) => HashKey::String(v.clone()),
            Value::List(_) | Value::Mapping(_) => return None,
        })
    }

    pub fn is_hashable(&self) -> bool {
        self.hash_key().is_some()
    }
}
