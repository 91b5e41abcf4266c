use super::{field_path, refuse, Lowered};
use crate::{merge, value::to_bson};

use bson::{Bson, Document};
use sieve_core::{
    dispatch::{NodeKind, Registry},
    schema::Schema,
    stmt::{BinaryOp, Node, NodeBinaryOp, NodeId, NodeLiteral, Pattern, Request, Type, Value},
};

use std::sync::LazyLock;

type Handler = fn(&Filter<'_>, NodeId) -> Lowered<Document>;

static HANDLERS: LazyLock<Registry<Handler>> = LazyLock::new(|| {
    Registry::new()
        .with(NodeKind::Comparison, comparison as Handler)
        .with(NodeKind::And, and)
        .with(NodeKind::Or, or)
        .with(NodeKind::Not, not)
        .with(NodeKind::Matches, matches)
        .with(NodeKind::Attribute, flag)
        .with(NodeKind::Literal, constant)
});

/// Lowers a filter predicate, with `ctx(0)` bound to an element of type `item`.
pub(super) struct Filter<'a> {
    request: &'a Request,
    schema: &'a Schema,
    item: Type,
}

impl<'a> Filter<'a> {
    pub(super) fn new(request: &'a Request, schema: &'a Schema, item: Type) -> Filter<'a> {
        Filter {
            request,
            schema,
            item,
        }
    }

    pub(super) fn lower(&self, id: NodeId) -> Lowered<Document> {
        let handler = HANDLERS
            .resolve(self.request, id)
            .map_err(|err| refuse(id, err.to_string()))?;
        handler(self, id)
    }

    fn binary_op(&self, id: NodeId) -> Lowered<&'a NodeBinaryOp> {
        match self.request.node(id) {
            Node::BinaryOp(node) => Ok(node),
            _ => Err(refuse(id, "expected a binary operator")),
        }
    }

    /// The path of a field of the element holding scalars.
    fn scalar_field(&self, id: NodeId) -> Option<String> {
        let path = field_path(self.request, id)?;
        let ty = self
            .request
            .infer_node_ty(id, self.schema, std::slice::from_ref(&self.item))
            .ok()?;
        ty.is_scalar().then_some(path)
    }

    fn scalar_literal(&self, id: NodeId) -> Option<&'a Value> {
        match self.request.node(id) {
            Node::Literal(NodeLiteral { value }) if !value.is_list() && !value.is_mapping() => {
                Some(value)
            }
            _ => None,
        }
    }
}

/// Returns `false` when some node under `id` has a shape no handler lowers: a comparison that
/// is not between a field and a scalar literal, or a pattern that is not an anchored literal.
pub(super) fn translatable(request: &Request, id: NodeId) -> bool {
    let is_field = |id: NodeId| field_path(request, id).is_some();
    let is_scalar = |id: NodeId| {
        matches!(
            request.node(id),
            Node::Literal(NodeLiteral { value }) if !value.is_list() && !value.is_mapping()
        )
    };

    let mut translatable = true;
    request.walk(id, &mut |_, node, _| {
        let Node::BinaryOp(node) = node else {
            return;
        };
        translatable &= match node.op {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => {
                (is_field(node.lhs) && is_scalar(node.rhs))
                    || (is_field(node.rhs) && is_scalar(node.lhs))
            }
            BinaryOp::Matches => is_field(node.lhs) && Pattern::literal(request, node.rhs).is_some(),
            _ => true,
        };
    });
    translatable
}

fn field(path: String, condition: impl Into<Bson>) -> Document {
    let mut doc = Document::new();
    doc.insert(path, condition.into());
    doc
}

fn operator(op: &str, value: Bson) -> Document {
    let mut doc = Document::new();
    doc.insert(op, value);
    doc
}

/// `field op literal`, in either operand order.
fn comparison(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let node = filter.binary_op(id)?;

    let (path, value, op) = if let (Some(path), Some(value)) =
        (filter.scalar_field(node.lhs), filter.scalar_literal(node.rhs))
    {
        (path, value, node.op)
    } else if let (Some(path), Some(value)) =
        (filter.scalar_field(node.rhs), filter.scalar_literal(node.lhs))
    {
        (path, value, flip(node.op))
    } else {
        return Err(refuse(id, "comparisons must be between a field and a literal"));
    };

    let value = to_bson(value);
    let condition = match op {
        BinaryOp::Eq => value,
        BinaryOp::Ne => Bson::Document(operator("$ne", value)),
        BinaryOp::Lt => Bson::Document(operator("$lt", value)),
        BinaryOp::Le => Bson::Document(operator("$lte", value)),
        BinaryOp::Gt => Bson::Document(operator("$gt", value)),
        BinaryOp::Ge => Bson::Document(operator("$gte", value)),
        _ => return Err(refuse(id, "not a comparison")),
    };
    Ok(field(path, condition))
}

/// The operator giving the same result with the operands swapped.
fn flip(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Le => BinaryOp::Ge,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Ge => BinaryOp::Le,
        op => op,
    }
}

fn and(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let node = filter.binary_op(id)?;
    let lhs = filter.lower(node.lhs)?;
    let rhs = filter.lower(node.rhs)?;
    Ok(merge::and(lhs, rhs))
}

fn or(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let node = filter.binary_op(id)?;
    let lhs = filter.lower(node.lhs)?;
    let rhs = filter.lower(node.rhs)?;
    Ok(merge::or(lhs, rhs))
}

/// Negates single-field conditions in place, anything else through `$nor`.
fn not(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let Node::UnaryOp(node) = filter.request.node(id) else {
        return Err(refuse(id, "expected a negation"));
    };
    let inner = filter.lower(node.subject)?;

    let single = match inner.iter().next() {
        Some((path, condition)) if inner.len() == 1 && !path.starts_with('$') => {
            Some((path.clone(), condition.clone()))
        }
        _ => None,
    };

    Ok(match single {
        Some((path, Bson::Document(ops))) if ops.keys().all(|key| key.starts_with('$')) => {
            match ops.get("$ne") {
                Some(value) if ops.len() == 1 => field(path, value.clone()),
                _ => field(path, operator("$not", Bson::Document(ops))),
            }
        }
        Some((path, value)) if !matches!(value, Bson::Document(_)) => {
            field(path, operator("$ne", value))
        }
        _ => operator("$nor", Bson::Array(vec![Bson::Document(inner)])),
    })
}

/// Anchored literal patterns, as an equality or a prefix `$regex`.
fn matches(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let node = filter.binary_op(id)?;
    let Some(path) = filter.scalar_field(node.lhs) else {
        return Err(refuse(id, "patterns must be matched against a field"));
    };
    let Node::Literal(NodeLiteral {
        value: Value::String(pattern),
    }) = filter.request.node(node.rhs)
    else {
        return Err(refuse(id, "patterns must be literals"));
    };

    match Pattern::parse(pattern) {
        Some(Pattern::Exact(text)) => Ok(field(path, text)),
        Some(Pattern::Prefix(prefix)) => Ok(field(
            path,
            operator("$regex", Bson::String(format!("^{prefix}"))),
        )),
        None => Err(refuse(id, "only anchored literal patterns are supported")),
    }
}

/// A boolean field used as the predicate.
fn flag(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    let is_bool = filter
        .request
        .infer_node_ty(id, filter.schema, std::slice::from_ref(&filter.item))
        .is_ok_and(|ty| ty.is_bool());
    match field_path(filter.request, id) {
        Some(path) if is_bool => Ok(field(path, true)),
        _ => Err(refuse(id, "expected a boolean field")),
    }
}

fn constant(filter: &Filter<'_>, id: NodeId) -> Lowered<Document> {
    match filter.request.node(id) {
        Node::Literal(NodeLiteral {
            value: Value::Bool(true),
        }) => Ok(Document::new()),
        Node::Literal(NodeLiteral {
            value: Value::Bool(false),
        }) => Ok(operator("$nor", Bson::Array(vec![Bson::Document(Document::new())]))),
        _ => Err(refuse(id, "expected a boolean literal")),
    }
}
