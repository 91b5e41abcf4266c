use crate::stmt::{Node, NodeId, Request};

/// The fields of an element a request reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementFields<'a> {
    /// Only these fields, in first-seen order.
    Some(Vec<&'a str>),

    /// The element is used as a whole.
    All,
}

impl ElementFields<'_> {
    /// Returns `true` if every field read is in `allowed`.
    pub fn within(&self, allowed: &[&str]) -> bool {
        match self {
            ElementFields::Some(fields) => fields.iter().all(|field| allowed.contains(field)),
            ElementFields::All => false,
        }
    }
}

/// Collects the fields of the element bound at `level` scopes outwards from `id` that the
/// subtree at `id` reads.
///
/// With `level == 0` the element is `ctx(0)` as seen by the subtree's root, the way a filter
/// predicate sees the element being tested.
pub fn element_fields(request: &Request, id: NodeId, level: usize) -> ElementFields<'_> {
    let mut fields = vec![];
    if collect(request, id, level, &mut fields) {
        ElementFields::Some(fields)
    } else {
        ElementFields::All
    }
}

/// Returns `false` as soon as the element is used other than through an attribute.
fn collect<'a>(request: &'a Request, id: NodeId, level: usize, fields: &mut Vec<&'a str>) -> bool {
    match request.node(id) {
        Node::Attribute(attribute) => {
            if let Node::Context(context) = request.node(attribute.subject) {
                if context.up == level {
                    if !fields.contains(&&attribute.name[..]) {
                        fields.push(&attribute.name);
                    }
                    return true;
                }
            }
            collect(request, attribute.subject, level, fields)
        }
        Node::Context(context) => context.up != level,
        node => {
            let mut whole = false;
            node.for_each_child(|child, scopes| {
                whole = whole || !collect(request, child, level + scopes, fields);
            });
            !whole
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{ctx, ctx_up};

    #[test]
    fn attributes_of_the_element() {
        let request = ctx().attr("a").eq(1).and(ctx().attr("b").gt(ctx().attr("a")));
        assert_eq!(
            element_fields(&request, request.root(), 0),
            ElementFields::Some(vec!["a", "b"])
        );
    }

    #[test]
    fn bare_element_reads_everything() {
        let request = ctx().eq(Request::source("items").index(0));
        assert_eq!(
            element_fields(&request, request.root(), 0),
            ElementFields::All
        );
    }

    #[test]
    fn nested_scopes_count_levels() {
        // ctx(-1) inside the inner filter is the outer element.
        let request = Request::source("orders")
            .filter(ctx().attr("customer").eq(ctx_up(1).attr("id")))
            .len()
            .gt(0);
        let fields = element_fields(&request, request.root(), 0);
        assert_eq!(fields, ElementFields::Some(vec!["id"]));
        assert!(fields.within(&["id", "name"]));
        assert!(!fields.within(&["name"]));
    }
}
