use super::{Node, NodeId, Request};

/// Keeps the elements of the subject for which the predicate holds.
///
/// The predicate is evaluated with the element bound to `ctx(0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFilter {
    pub subject: NodeId,
    pub predicate: NodeId,
}

impl Request {
    pub fn filter(self, predicate: impl Into<Request>) -> Request {
        self.combine(predicate, |subject, predicate| {
            NodeFilter { subject, predicate }.into()
        })
    }
}

impl From<NodeFilter> for Node {
    fn from(value: NodeFilter) -> Self {
        Self::Filter(value)
    }
}
