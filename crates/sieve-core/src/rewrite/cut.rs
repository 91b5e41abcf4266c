use super::shift;
use crate::{
    stmt::{Node, NodeContext, NodeId, Request},
    Error, Result,
};

/// A request cut in two along its chain.
///
/// Evaluating `after` with the result of `before` bound to `ctx(0)` gives the result of the
/// original request.
#[derive(Debug, Clone)]
pub struct Cut {
    pub before: Request,
    pub after: Request,
}

impl Cut {
    pub fn recompose(&self) -> Result<Request> {
        recompose(&self.before, &self.after)
    }
}

/// Cuts `request` at `marker`, a node of its chain.
///
/// `before` is the subtree at `marker`. `after` is the request with `marker` replaced by
/// `ctx(0)`. Context references of `after` that point outside the request are moved one scope
/// outwards to make room for the placeholder.
pub fn cut(request: &Request, marker: NodeId) -> Result<Cut> {
    let chain = request.chain();
    let Some(position) = chain.iter().position(|id| *id == marker) else {
        return Err(Error::invalid_request(format!(
            "node {marker:?} is not on the chain of `{request}`"
        )));
    };

    let mut after = request.clone();
    let placeholder = after.push(NodeContext { up: 0 });
    let root = rebuild_chain(&mut after, &chain[position + 1..], placeholder, 1);

    Ok(Cut {
        before: request.with_root(marker),
        after: after.with_root(root),
    })
}

/// Undoes [`cut`]: substitutes `before` for the `ctx(0)` at the bottom of `after`'s chain.
pub fn recompose(before: &Request, after: &Request) -> Result<Request> {
    let chain = after.chain();
    if !matches!(after.node(chain[0]), Node::Context(NodeContext { up: 0 })) {
        return Err(Error::invalid_request(format!(
            "`{after}` does not start with a placeholder"
        )));
    }

    // The placeholder binding disappears, so nothing else may refer to it.
    for &id in &chain[1..] {
        let mut first = true;
        let mut clash = false;
        after.node(id).for_each_child(|child, scopes| {
            if !std::mem::take(&mut first) {
                clash = clash || refers_to(after, child, scopes);
            }
        });
        if clash {
            return Err(Error::invalid_request(format!(
                "`{after}` uses the placeholder outside of its chain"
            )));
        }
    }

    let mut request = after.clone();
    let subject = request.import(before);
    let root = rebuild_chain(&mut request, &chain[1..], subject, -1);
    Ok(request.with_root(root))
}

/// Replaces `target`, a node of the chain of `request`, by `replacement`, a node of the same
/// arena evaluated in the same scope.
pub fn replace_on_chain(request: &Request, target: NodeId, replacement: NodeId) -> Result<Request> {
    let chain = request.chain();
    let Some(position) = chain.iter().position(|id| *id == target) else {
        return Err(Error::invalid_request(format!(
            "node {target:?} is not on the chain of `{request}`"
        )));
    };

    let mut out = request.clone();
    let root = rebuild_chain(&mut out, &chain[position + 1..], replacement, 0);
    Ok(out.with_root(root))
}

/// Re-allocates the chain `entries` on top of `subject`. Children other than the subjects are
/// shifted by `by` scopes.
fn rebuild_chain(
    request: &mut Request,
    entries: &[NodeId],
    mut subject: NodeId,
    by: isize,
) -> NodeId {
    for &id in entries {
        let node = request.node(id).clone();
        // The subject is always the first child visited.
        let mut first = true;
        let rebuilt = node.map_children(|child, scopes| {
            if std::mem::take(&mut first) {
                subject
            } else {
                shift(request, child, scopes, by)
            }
        });
        subject = request.push(rebuilt);
    }
    subject
}

/// Returns `true` if the subtree at `id` reads the element bound `level` scopes outwards.
fn refers_to(request: &Request, id: NodeId, level: usize) -> bool {
    let mut found = false;
    request.walk(id, &mut |_, node, depth| {
        if let Node::Context(context) = node {
            found = found || context.up == level + depth;
        }
    });
    found
}
