use super::{Node, NodeId, Request};

/// Keeps the first occurrence of every element.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDistinct {
    pub subject: NodeId,
}

impl Request {
    pub fn distinct(self) -> Request {
        self.wrap(|subject| NodeDistinct { subject }.into())
    }
}

impl From<NodeDistinct> for Node {
    fn from(value: NodeDistinct) -> Self {
        Self::Distinct(value)
    }
}
