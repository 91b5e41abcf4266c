use super::{Node, Request};

/// A named collection, resolved against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSource {
    pub name: String,
}

impl Request {
    pub fn source(name: impl Into<String>) -> Request {
        Request::from_node(NodeSource { name: name.into() })
    }
}

impl From<NodeSource> for Node {
    fn from(value: NodeSource) -> Self {
        Self::Source(value)
    }
}
