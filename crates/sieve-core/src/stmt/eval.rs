mod group;
mod op;
mod scope;
pub use scope::Scope;
mod sort;
mod window;

use crate::{
    stmt::{AggregateOp, BinaryOp, ConstInput, Input, Node, NodeId, Request, Value},
    Error, Result,
};

use group::{Groups, Seen};
use op::Patterns;
use sort::Keyed;

/// A lazily produced sequence of values.
pub type Seq<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

/// Result of evaluating a node: either a value or a sequence that has not been drained yet.
pub enum Evaluated<'a> {
    Value(Value),
    Seq(Seq<'a>),
}

impl Evaluated<'_> {
    pub fn into_value(self) -> Result<Value> {
        match self {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Seq(items) => items.collect::<Result<Vec<_>>>().map(Value::List),
        }
    }
}

impl Request {
    /// Evaluates the request, scanning sources from `input`.
    pub fn eval(&self, input: &dyn Input) -> Result<Value> {
        self.eval_with(input, Scope::new())
    }

    /// Evaluates the request with `scope` bound to the context references that escape it.
    pub fn eval_with(&self, input: &dyn Input, scope: Scope) -> Result<Value> {
        let patterns = Patterns::default();
        let interpreter = Interpreter {
            request: self,
            input,
            patterns: &patterns,
        };
        interpreter.value(self.root(), &scope)
    }

    /// Evaluates a request that reads no source.
    pub fn eval_const(&self) -> Result<Value> {
        self.eval(&ConstInput::new())
    }
}

/// Walks a request, producing values.
///
/// Collection operators return lazy sequences where they can, so that a chain of filters, maps
/// and forward slices pulls only the elements it needs.
#[derive(Clone, Copy)]
struct Interpreter<'a> {
    request: &'a Request,
    input: &'a dyn Input,
    patterns: &'a Patterns,
}

impl<'a> Interpreter<'a> {
    fn value(self, id: NodeId, scope: &Scope) -> Result<Value> {
        self.eval(id, scope)?.into_value()
    }

    fn bool(self, id: NodeId, scope: &Scope) -> Result<bool> {
        self.value(id, scope)?.to_bool()
    }

    /// Evaluates `id` as a sequence. Strings are sequences of one-character strings.
    fn seq(self, id: NodeId, scope: &Scope) -> Result<Seq<'a>> {
        match self.eval(id, scope)? {
            Evaluated::Value(Value::String(s)) => Ok(Box::new(
                s.chars()
                    .map(|c| Ok(Value::String(c.to_string())))
                    .collect::<Vec<_>>()
                    .into_iter(),
            )),
            evaluated => self.sequence(evaluated),
        }
    }

    fn eval(self, id: NodeId, scope: &Scope) -> Result<Evaluated<'a>> {
        let value = match self.request.node(id) {
            Node::Source(node) => Value::List(self.input.scan(&node.name)?),
            Node::Literal(node) => node.value.clone(),
            Node::Context(node) => scope.get(node.up).cloned().ok_or_else(|| {
                Error::expression_evaluation_failed(format!(
                    "ctx({}) escapes the {} enclosing scopes",
                    node.depth(),
                    scope.depth()
                ))
            })?,
            Node::Attribute(node) => match self.value(node.subject, scope)? {
                Value::Mapping(mut fields) => {
                    fields.swap_remove(&node.name).ok_or_else(|| {
                        Error::expression_evaluation_failed(format!(
                            "mapping has no field `{}`",
                            node.name
                        ))
                    })?
                }
                other => {
                    return Err(Error::expression_evaluation_failed(format!(
                        "cannot read field `{}` of {}",
                        node.name,
                        other.kind_name()
                    )))
                }
            },
            Node::UnaryOp(node) => op::unary(node.op, self.value(node.subject, scope)?)?,
            Node::BinaryOp(node) => match node.op {
                BinaryOp::And => {
                    Value::Bool(self.bool(node.lhs, scope)? && self.bool(node.rhs, scope)?)
                }
                BinaryOp::Or => {
                    Value::Bool(self.bool(node.lhs, scope)? || self.bool(node.rhs, scope)?)
                }
                op => {
                    let lhs = self.value(node.lhs, scope)?;
                    let rhs = self.value(node.rhs, scope)?;
                    op::binary(self.patterns, op, lhs, rhs)?
                }
            },
            Node::Record(node) => Value::Mapping(
                node.fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), self.value(*field, scope)?)))
                    .collect::<Result<_>>()?,
            ),
            Node::Filter(node) => {
                let items = self.seq(node.subject, scope)?;
                let scope = scope.clone();
                let predicate = node.predicate;
                return Ok(Evaluated::Seq(Box::new(items.filter_map(move |item| {
                    let item = match item {
                        Ok(item) => item,
                        Err(err) => return Some(Err(err)),
                    };
                    match self.bool(predicate, &scope.push(item.clone())) {
                        Ok(true) => Some(Ok(item)),
                        Ok(false) => None,
                        Err(err) => Some(Err(err)),
                    }
                }))));
            }
            Node::Map(node) => {
                let items = self.seq(node.subject, scope)?;
                let scope = scope.clone();
                let transform = node.transform;
                return Ok(Evaluated::Seq(Box::new(items.map(move |item| {
                    self.value(transform, &scope.push(item?))
                }))));
            }
            Node::Sort(node) => {
                let mut rows = vec![];
                for item in self.seq(node.subject, scope)? {
                    let value = item?;
                    let inner = scope.push(value.clone());
                    let keys = node
                        .keys
                        .iter()
                        .map(|key| self.value(key.key, &inner))
                        .collect::<Result<_>>()?;
                    rows.push(Keyed { keys, value });
                }
                let descending: Vec<_> = node.keys.iter().map(|key| key.descending).collect();
                Value::List(sort::sort(rows, &descending))
            }
            Node::Slice(node) => match self.eval(node.subject, scope)? {
                Evaluated::Value(Value::String(s)) => {
                    let chars = Box::new(s.chars().map(|c| Ok(Value::String(c.to_string()))));
                    let sliced = window::slice(chars, node.start, node.stop)?;
                    Value::String(join_chars(sliced)?)
                }
                evaluated => {
                    let items = self.sequence(evaluated)?;
                    return Ok(Evaluated::Seq(window::slice(items, node.start, node.stop)?));
                }
            },
            Node::Index(node) => window::index(self.seq(node.subject, scope)?, node.index)?,
            Node::Groupby(node) => {
                let mut groups = Groups::new();
                for item in self.seq(node.subject, scope)? {
                    let element = item?;
                    let key = self.value(node.key, &scope.push(element.clone()))?;
                    groups.insert(key, element);
                }

                let mut result = vec![];
                for (key, members) in groups.into_groups() {
                    let mut fields = indexmap::IndexMap::new();
                    fields.insert("key".to_string(), key);
                    if node.aggregates.is_empty() {
                        fields.insert("group".to_string(), Value::List(members));
                    } else {
                        let inner = scope.push(Value::List(members));
                        for (name, aggregate) in &node.aggregates {
                            fields.insert(name.clone(), self.value(*aggregate, &inner)?);
                        }
                    }
                    result.push(Value::Mapping(fields));
                }
                Value::List(result)
            }
            Node::Distinct(node) => {
                let items = self.seq(node.subject, scope)?;
                let mut seen = Seen::new();
                return Ok(Evaluated::Seq(Box::new(items.filter(move |item| {
                    match item {
                        Ok(value) => seen.insert(value),
                        Err(_) => true,
                    }
                }))));
            }
            Node::One(node) => {
                let mut items = self.seq(node.subject, scope)?;
                match (items.next().transpose()?, items.next().transpose()?) {
                    (Some(item), None) => item,
                    (Some(_), Some(_)) => {
                        return Err(Error::multiple_results(format!(
                            "one() over {}",
                            self.request.with_root(node.subject)
                        )))
                    }
                    (None, _) => match node.default {
                        Some(default) => self.value(default, scope)?,
                        None => {
                            return Err(Error::empty_result(format!(
                                "one() over {}",
                                self.request.with_root(node.subject)
                            )))
                        }
                    },
                }
            }
            Node::Aggregate(node) => match self.eval(node.subject, scope)? {
                Evaluated::Value(Value::String(s)) if node.op == AggregateOp::Len => {
                    Value::I64(s.chars().count() as i64)
                }
                Evaluated::Value(Value::Mapping(fields))
                    if node.op == AggregateOp::Len =>
                {
                    Value::I64(fields.len() as i64)
                }
                evaluated => op::aggregate(node.op, self.sequence(evaluated)?)?,
            },
        };

        Ok(Evaluated::Value(value))
    }

    fn sequence(self, evaluated: Evaluated<'a>) -> Result<Seq<'a>> {
        match evaluated {
            Evaluated::Seq(items) => Ok(items),
            Evaluated::Value(Value::List(items)) => Ok(Box::new(items.into_iter().map(Ok))),
            Evaluated::Value(other) => Err(Error::expression_evaluation_failed(format!(
                "expected a sequence, got {}",
                other.kind_name()
            ))),
        }
    }
}

fn join_chars(chars: Seq<'_>) -> Result<String> {
    let mut joined = String::new();
    for c in chars {
        if let Value::String(c) = c? {
            joined.push_str(&c);
        }
    }
    Ok(joined)
}
