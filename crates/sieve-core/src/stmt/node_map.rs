use super::{Node, NodeId, Request};

/// Transforms every element of the subject. The transform sees the element as `ctx(0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMap {
    pub subject: NodeId,
    pub transform: NodeId,
}

impl Request {
    pub fn map(self, transform: impl Into<Request>) -> Request {
        self.combine(transform, |subject, transform| {
            NodeMap { subject, transform }.into()
        })
    }
}

impl From<NodeMap> for Node {
    fn from(value: NodeMap) -> Self {
        Self::Map(value)
    }
}
