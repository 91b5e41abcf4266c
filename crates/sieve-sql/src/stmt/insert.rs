use sieve_core::stmt::Value;

/// Inserts one row.
///
/// When `replace_on` is not empty, a row with the same values in those columns is overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
    pub replace_on: Vec<String>,
}
