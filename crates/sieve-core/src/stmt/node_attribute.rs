use super::{Node, NodeId, Request};

/// Reads a named field of the subject, which must be a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttribute {
    pub subject: NodeId,
    pub name: String,
}

impl Request {
    pub fn attr(self, name: impl Into<String>) -> Request {
        let name = name.into();
        self.wrap(|subject| NodeAttribute { subject, name }.into())
    }
}

impl From<NodeAttribute> for Node {
    fn from(value: NodeAttribute) -> Self {
        Self::Attribute(value)
    }
}
