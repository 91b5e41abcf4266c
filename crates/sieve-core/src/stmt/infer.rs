use crate::{
    schema::Schema,
    stmt::{AggregateOp, BinaryOp, Node, NodeId, Request, Type, TypeMapping, UnaryOp},
    Error, Result,
};

use indexmap::IndexMap;

impl Request {
    /// Infers the type of the request, validating it against `schema` on the way.
    ///
    /// `args` are the types bound to context references that escape the request, outermost
    /// first: the last entry is `ctx(0)`.
    pub fn infer_ty(&self, schema: &Schema, args: &[Type]) -> Result<Type> {
        self.infer_node_ty(self.root(), schema, args)
    }

    /// Infers the type of the subtree at `id`. See [`Request::infer_ty`].
    pub fn infer_node_ty(&self, id: NodeId, schema: &Schema, args: &[Type]) -> Result<Type> {
        let mut infer = Infer {
            request: self,
            schema,
            scopes: args.to_vec(),
        };
        infer.infer(id)
    }
}

struct Infer<'a> {
    request: &'a Request,
    schema: &'a Schema,
    scopes: Vec<Type>,
}

impl Infer<'_> {
    fn infer(&mut self, id: NodeId) -> Result<Type> {
        let ty = match self.request.node(id) {
            Node::Source(node) => match self.schema.collection(&node.name) {
                Some(collection) => collection.ty(),
                None => {
                    return Err(Error::invalid_request(format!(
                        "unknown source `{}`",
                        node.name
                    )))
                }
            },
            Node::Literal(node) => node.value.infer_ty(),
            Node::Context(node) => {
                let Some(position) = self.scopes.len().checked_sub(node.up + 1) else {
                    return Err(Error::invalid_request(format!(
                        "ctx({}) escapes the {} enclosing scopes",
                        node.depth(),
                        self.scopes.len()
                    )));
                };
                self.scopes[position].clone()
            }
            Node::Attribute(node) => match self.infer(node.subject)? {
                Type::Any => Type::Any,
                Type::Mapping(mapping) => match mapping.fields.get(&node.name) {
                    Some(ty) => ty.clone(),
                    None => {
                        let owner = mapping.source.as_deref().unwrap_or("mapping");
                        return Err(Error::invalid_request(format!(
                            "`{owner}` has no field `{}`",
                            node.name
                        )));
                    }
                },
                other => {
                    return Err(Error::invalid_request(format!(
                        "cannot read field `{}` of {other:?}",
                        node.name
                    )))
                }
            },
            Node::UnaryOp(node) => {
                let operand = self.infer(node.subject)?;
                match (node.op, operand) {
                    (_, Type::Any) => Type::Any,
                    (UnaryOp::Not, Type::Bool) => Type::Bool,
                    (UnaryOp::Neg, ty) if ty.is_numeric() => ty,
                    (op, ty) => {
                        return Err(Error::invalid_request(format!(
                            "cannot apply `{op}` to {ty:?}"
                        )))
                    }
                }
            }
            Node::BinaryOp(node) => {
                let lhs = self.infer(node.lhs)?;
                let rhs = self.infer(node.rhs)?;
                binary_ty(node.op, lhs, rhs)?
            }
            Node::Record(node) => {
                let mut fields = IndexMap::new();
                for (name, field) in &node.fields {
                    fields.insert(name.clone(), self.infer(*field)?);
                }
                Type::Mapping(TypeMapping {
                    fields,
                    source: None,
                })
            }
            Node::Filter(node) => {
                let subject = self.infer(node.subject)?;
                let item = self.list_item(&subject, "filter")?;
                let predicate = self.scoped(item, node.predicate)?;
                if !matches!(predicate, Type::Bool | Type::Any) {
                    return Err(Error::invalid_request(format!(
                        "filter predicate must be boolean; got {predicate:?}"
                    )));
                }
                subject
            }
            Node::Map(node) => {
                let subject = self.infer(node.subject)?;
                let item = self.list_item(&subject, "map")?;
                Type::list(self.scoped(item, node.transform)?)
            }
            Node::Sort(node) => {
                let subject = self.infer(node.subject)?;
                let item = self.list_item(&subject, "sort")?;
                for key in &node.keys {
                    self.scoped(item.clone(), key.key)?;
                }
                subject
            }
            Node::Slice(node) => {
                let subject = self.infer(node.subject)?;
                self.sequence_item(&subject, "slice")?;
                subject
            }
            Node::Index(node) => {
                let subject = self.infer(node.subject)?;
                self.sequence_item(&subject, "index")?
            }
            Node::Groupby(node) => {
                let subject = self.infer(node.subject)?;
                let item = self.list_item(&subject, "groupby")?;
                let key = self.scoped(item.clone(), node.key)?;

                let mut fields = IndexMap::new();
                fields.insert("key".to_string(), key);
                if node.aggregates.is_empty() {
                    fields.insert("group".to_string(), subject.clone());
                } else {
                    for (name, aggregate) in &node.aggregates {
                        let ty = self.scoped(subject.clone(), *aggregate)?;
                        fields.insert(name.clone(), ty);
                    }
                }

                Type::list(TypeMapping {
                    fields,
                    source: None,
                })
            }
            Node::Distinct(node) => {
                let subject = self.infer(node.subject)?;
                self.list_item(&subject, "distinct")?;
                subject
            }
            Node::One(node) => {
                let subject = self.infer(node.subject)?;
                let item = self.list_item(&subject, "one")?;
                match node.default {
                    Some(default) => item.unify(self.infer(default)?),
                    None => item,
                }
            }
            Node::Aggregate(node) => {
                let subject = self.infer(node.subject)?;
                match node.op {
                    AggregateOp::Len => {
                        if !matches!(
                            subject,
                            Type::List(_) | Type::String | Type::Mapping(_) | Type::Any
                        ) {
                            return Err(Error::invalid_request(format!(
                                "len() requires a sequence or a mapping; got {subject:?}"
                            )));
                        }
                        Type::I64
                    }
                    AggregateOp::Sum => {
                        let item = self.list_item(&subject, "sum")?;
                        match item {
                            Type::I64 | Type::F64 | Type::Any => item,
                            // Elements of an empty list literal.
                            Type::Null => Type::I64,
                            other => {
                                return Err(Error::invalid_request(format!(
                                    "sum() requires numbers; got {other:?}"
                                )))
                            }
                        }
                    }
                    AggregateOp::Min | AggregateOp::Max => {
                        let item = self.list_item(&subject, &node.op.to_string())?;
                        item.unify(Type::Null)
                    }
                }
            }
        };

        Ok(ty)
    }

    /// Infers `id` with `item` bound to `ctx(0)`.
    fn scoped(&mut self, item: Type, id: NodeId) -> Result<Type> {
        self.scopes.push(item);
        let ty = self.infer(id);
        self.scopes.pop();
        ty
    }

    fn list_item(&self, ty: &Type, operation: &str) -> Result<Type> {
        match ty {
            Type::List(item) => Ok((**item).clone()),
            Type::Any => Ok(Type::Any),
            other => Err(Error::invalid_request(format!(
                "{operation}() requires a list; got {other:?}"
            ))),
        }
    }

    /// Like `list_item`, but strings count as sequences of strings.
    fn sequence_item(&self, ty: &Type, operation: &str) -> Result<Type> {
        match ty.as_item() {
            Some(item) => Ok(item.clone()),
            None => Err(Error::invalid_request(format!(
                "{operation}() requires a sequence; got {ty:?}"
            ))),
        }
    }
}

fn binary_ty(op: BinaryOp, lhs: Type, rhs: Type) -> Result<Type> {
    use BinaryOp::*;

    if op.is_comparison() {
        return Ok(Type::Bool);
    }

    let ty = match (op, lhs, rhs) {
        (And | Or, lhs, rhs) => {
            for operand in [&lhs, &rhs] {
                if !matches!(operand, Type::Bool | Type::Any) {
                    return Err(Error::invalid_request(format!(
                        "`{op}` requires boolean operands; got {operand:?}"
                    )));
                }
            }
            Type::Bool
        }
        (Matches, lhs, rhs) => {
            for operand in [&lhs, &rhs] {
                if !matches!(operand, Type::String | Type::Any) {
                    return Err(Error::invalid_request(format!(
                        "`matches` requires string operands; got {operand:?}"
                    )));
                }
            }
            Type::Bool
        }
        (_, Type::Any, _) | (_, _, Type::Any) => Type::Any,
        (Div, lhs, rhs) if lhs.is_numeric() && rhs.is_numeric() => Type::F64,
        (_, Type::I64, Type::I64) => Type::I64,
        (_, lhs, rhs) if lhs.is_numeric() && rhs.is_numeric() => Type::F64,
        (Add, Type::String, Type::String) => Type::String,
        (Add, Type::List(lhs), Type::List(rhs)) => Type::list(lhs.unify(*rhs)),
        (Add, Type::Mapping(mut lhs), Type::Mapping(rhs)) => {
            lhs.fields.extend(rhs.fields);
            lhs.source = None;
            Type::Mapping(lhs)
        }
        (op, lhs, rhs) => {
            return Err(Error::invalid_request(format!(
                "unsupported operand types for `{op}`: {lhs:?} and {rhs:?}"
            )))
        }
    };

    Ok(ty)
}
