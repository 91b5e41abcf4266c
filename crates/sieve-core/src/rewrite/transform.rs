use crate::stmt::{Node, NodeContext, NodeId, Request};

/// Rebuilds the subtree at `id` bottom-up.
///
/// `f` is called on every node before its children, with the number of scopes between the node
/// and `id` plus `level`. When it returns a replacement, the node is swapped and its children are
/// not visited. Nodes whose children did not change are reused as is.
pub fn transform<F>(request: &mut Request, id: NodeId, level: usize, f: &mut F) -> NodeId
where
    F: FnMut(&mut Request, NodeId, usize) -> Option<NodeId>,
{
    if let Some(replacement) = f(request, id, level) {
        return replacement;
    }

    let node = request.node(id).clone();
    let mut changed = false;
    let rebuilt = node.map_children(|child, scopes| {
        let new = transform(request, child, level + scopes, &mut *f);
        changed |= new != child;
        new
    });

    if changed {
        request.push(rebuilt)
    } else {
        id
    }
}

/// Moves every context reference escaping the subtree at `id` by `by` scopes.
///
/// A reference escapes when it points past the scopes opened inside the subtree. `level` is the
/// number of scopes already opened between the subtree and the point references are counted
/// from. References that would point inside the subtree after a negative shift are left alone.
pub fn shift(request: &mut Request, id: NodeId, level: usize, by: isize) -> NodeId {
    if by == 0 {
        return id;
    }

    transform(request, id, level, &mut |request, id, level| {
        let Node::Context(context) = request.node(id) else {
            return None;
        };
        if context.up < level {
            return None;
        }
        let up = context.up.checked_add_signed(by).filter(|up| *up >= level)?;
        Some(request.push(NodeContext { up }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{ctx, ctx_up};

    #[test]
    fn shift_leaves_bound_contexts() {
        // ctx(0) inside the filter is bound by the filter itself.
        let mut request = Request::source("items").filter(ctx().attr("a").eq(ctx_up(1).attr("b")));
        let root = request.root();
        let shifted = shift(&mut request, root, 0, 1);
        let shifted = request.with_root(shifted);

        assert_eq!(
            shifted.to_string(),
            "items.filter((ctx(0).a == ctx(-2).b))"
        );
    }

    #[test]
    fn unchanged_subtrees_are_reused() {
        let mut request = Request::source("items").filter(ctx().attr("a").eq(1));
        let root = request.root();
        let before = request.arena_len();
        assert_eq!(shift(&mut request, root, 0, 1), root);
        assert_eq!(request.arena_len(), before);
    }

    #[test]
    fn negative_shift_stops_at_the_subtree() {
        let mut request = ctx_up(2).attr("a").add(ctx().attr("b"));
        let root = request.root();
        let shifted = shift(&mut request, root, 1, -1);
        assert_eq!(request.with_root(shifted).to_string(), "(ctx(-1).a + ctx(0).b)");
    }
}
