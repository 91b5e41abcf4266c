use bson::{Bson, Document};
use regex::Regex;
use sieve_core::{bail, stmt::Value, Error, Result};
use sieve_document::value::from_bson;

use std::collections::HashMap;

/// Evaluates filter documents against elements.
///
/// Comparisons follow the interpreter: equality is `Value::is_eq` and ordered comparisons fail
/// on values of different kinds.
#[derive(Debug, Default)]
pub(crate) struct Matcher {
    patterns: HashMap<String, Regex>,
}

impl Matcher {
    pub(crate) fn matches(&mut self, filter: &Document, element: &Value) -> Result<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => {
                    let mut all = true;
                    for operand in operands(key, condition)? {
                        if !self.matches(operand, element)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                "$or" => self.any(key, condition, element)?,
                "$nor" => !self.any(key, condition, element)?,
                op if op.starts_with('$') => bail!("unsupported operator `{op}`"),
                path => {
                    let value = lookup(element, path).unwrap_or(&Value::Null);
                    self.condition(value, condition)?
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn any(&mut self, key: &str, condition: &Bson, element: &Value) -> Result<bool> {
        for operand in operands(key, condition)? {
            if self.matches(operand, element)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Checks one field's value against `{$op: operand, ..}` or an exact value.
    fn condition(&mut self, value: &Value, condition: &Bson) -> Result<bool> {
        let ops = match condition {
            Bson::Document(ops) if !ops.is_empty() && ops.keys().all(|op| op.starts_with('$')) => {
                ops
            }
            exact => return Ok(value.is_eq(&from_bson(exact)?)),
        };

        for (op, operand) in ops {
            let matched = match op.as_str() {
                "$eq" => value.is_eq(&from_bson(operand)?),
                "$ne" => !value.is_eq(&from_bson(operand)?),
                "$gt" => value.cmp_ordered(&from_bson(operand)?)?.is_gt(),
                "$gte" => value.cmp_ordered(&from_bson(operand)?)?.is_ge(),
                "$lt" => value.cmp_ordered(&from_bson(operand)?)?.is_lt(),
                "$lte" => value.cmp_ordered(&from_bson(operand)?)?.is_le(),
                "$regex" => self.regex(value, operand)?,
                "$not" => !self.condition(value, operand)?,
                other => bail!("unsupported operator `{other}`"),
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn regex(&mut self, value: &Value, pattern: &Bson) -> Result<bool> {
        let Bson::String(pattern) = pattern else {
            bail!("`$regex` expects a string; got {pattern}");
        };
        let Some(haystack) = value.as_str() else {
            return Err(Error::expression_evaluation_failed(format!(
                "`matches` requires strings; got {}",
                value.kind_name()
            )));
        };

        if !self.patterns.contains_key(pattern) {
            self.patterns.insert(pattern.clone(), Regex::new(pattern)?);
        }
        Ok(self
            .patterns
            .get(pattern)
            .is_some_and(|regex| regex.is_match(haystack)))
    }
}

fn operands<'a>(key: &str, condition: &'a Bson) -> Result<Vec<&'a Document>> {
    let Bson::Array(operands) = condition else {
        bail!("`{key}` expects a list of filters");
    };
    operands
        .iter()
        .map(|operand| match operand {
            Bson::Document(doc) => Ok(doc),
            other => bail!("`{key}` expects filters; got {other}"),
        })
        .collect()
}

/// The value at a dotted path, if every step is a field of a mapping.
pub(crate) fn lookup<'a>(element: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(element, |value, name| value.as_mapping()?.get(name))
}
