use super::Value;
use crate::Result;

use indexmap::IndexMap;
use std::collections::HashMap;

/// Supplies the contents of sources while a request is being interpreted.
pub trait Input {
    /// Returns every element of source `name`.
    fn scan(&self, name: &str) -> Result<Vec<Value>>;
}

/// Input with no sources; every scan fails.
#[derive(Debug, Default)]
pub struct ConstInput {}

impl ConstInput {
    pub fn new() -> ConstInput {
        ConstInput {}
    }
}

impl Input for ConstInput {
    fn scan(&self, name: &str) -> Result<Vec<Value>> {
        Err(crate::Error::expression_evaluation_failed(format!(
            "source `{name}` is not available"
        )))
    }
}

impl<T: Input + ?Sized> Input for &T {
    fn scan(&self, name: &str) -> Result<Vec<Value>> {
        (**self).scan(name)
    }
}

impl Input for IndexMap<String, Vec<Value>> {
    fn scan(&self, name: &str) -> Result<Vec<Value>> {
        match self.get(name) {
            Some(items) => Ok(items.clone()),
            None => ConstInput::new().scan(name),
        }
    }
}

impl Input for HashMap<String, Vec<Value>> {
    fn scan(&self, name: &str) -> Result<Vec<Value>> {
        match self.get(name) {
            Some(items) => Ok(items.clone()),
            None => ConstInput::new().scan(name),
        }
    }
}
