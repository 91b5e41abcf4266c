use super::{Node, NodeId, Request};

/// `subject[index]`, with a negative index counting from the end.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeIndex {
    pub subject: NodeId,
    pub index: i64,
}

impl Request {
    pub fn index(self, index: i64) -> Request {
        self.wrap(|subject| NodeIndex { subject, index }.into())
    }
}

impl From<NodeIndex> for Node {
    fn from(value: NodeIndex) -> Self {
        Self::Index(value)
    }
}
