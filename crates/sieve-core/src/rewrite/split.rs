use super::element_fields;
use crate::stmt::{BinaryOp, Node, NodeBinaryOp, NodeId, NodeLiteral, Request, Value};

/// A predicate split in two parts whose conjunction is the original predicate.
#[derive(Debug, Clone)]
pub struct Split {
    pub local: Request,
    pub remainder: Request,
}

/// Splits `predicate` into the conjuncts reading only `fields` of the element and the rest.
///
/// `and` is split recursively. Any other node, `or` included, goes entirely to one side. A bare
/// reference to the element reads every field, so it is never local. An empty side is
/// `Literal(true)`.
pub fn split(predicate: &Request, fields: &[&str]) -> Split {
    split_by(predicate, |request, id| {
        element_fields(request, id, 0).within(fields)
    })
}

/// Splits `predicate` into the conjuncts for which `keep` holds and the rest.
pub fn split_by(predicate: &Request, keep: impl FnMut(&Request, NodeId) -> bool) -> Split {
    let mut request = predicate.clone();
    let root = request.root();
    let (local, remainder) = split_in(&mut request, root, keep);
    Split {
        local: request.with_root(local),
        remainder: request.with_root(remainder),
    }
}

/// Splits the predicate at `id` in place. New nodes are appended to `request`.
///
/// Returns the ids of the local part and of the remainder.
pub fn split_in(
    request: &mut Request,
    id: NodeId,
    mut keep: impl FnMut(&Request, NodeId) -> bool,
) -> (NodeId, NodeId) {
    let (local, remainder) = split_node(request, id, &mut keep);
    let mut or_true = |part: Option<NodeId>| {
        part.unwrap_or_else(|| {
            request.push(NodeLiteral {
                value: Value::Bool(true),
            })
        })
    };
    (or_true(local), or_true(remainder))
}

/// The operands of the `and` tree at `id`, left to right.
pub fn conjuncts(request: &Request, id: NodeId) -> Vec<NodeId> {
    let mut out = vec![];
    collect_conjuncts(request, id, &mut out);
    out
}

fn collect_conjuncts(request: &Request, id: NodeId, out: &mut Vec<NodeId>) {
    match request.node(id) {
        Node::BinaryOp(NodeBinaryOp {
            op: BinaryOp::And,
            lhs,
            rhs,
        }) => {
            collect_conjuncts(request, *lhs, out);
            collect_conjuncts(request, *rhs, out);
        }
        _ => out.push(id),
    }
}

fn split_node(
    request: &mut Request,
    id: NodeId,
    keep: &mut impl FnMut(&Request, NodeId) -> bool,
) -> (Option<NodeId>, Option<NodeId>) {
    let Node::BinaryOp(NodeBinaryOp {
        op: BinaryOp::And,
        lhs,
        rhs,
    }) = request.node(id)
    else {
        return if keep(&*request, id) {
            (Some(id), None)
        } else {
            (None, Some(id))
        };
    };
    let (lhs, rhs) = (*lhs, *rhs);

    let (lhs_local, lhs_remainder) = split_node(request, lhs, keep);
    let (rhs_local, rhs_remainder) = split_node(request, rhs, keep);

    if lhs_remainder.is_none() && rhs_remainder.is_none() {
        return (Some(id), None);
    }
    if lhs_local.is_none() && rhs_local.is_none() {
        return (None, Some(id));
    }

    (
        conjoin(request, lhs_local, rhs_local),
        conjoin(request, lhs_remainder, rhs_remainder),
    )
}

fn conjoin(request: &mut Request, lhs: Option<NodeId>, rhs: Option<NodeId>) -> Option<NodeId> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(request.push(NodeBinaryOp {
            op: BinaryOp::And,
            lhs,
            rhs,
        })),
        (part, None) | (None, part) => part,
    }
}
