use super::{Node, NodeId, Request};

use indexmap::IndexMap;

/// Builds a mapping by evaluating each field in the current scope.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub fields: IndexMap<String, NodeId>,
}

impl Request {
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Request
    where
        K: Into<String>,
        V: Into<Request>,
    {
        let mut request = Request::empty();
        let mut ids = IndexMap::new();
        for (name, field) in fields {
            let id = request.import(&field.into());
            ids.insert(name.into(), id);
        }
        let root = request.push(NodeRecord { fields: ids });
        request.with_root(root)
    }
}

impl From<NodeRecord> for Node {
    fn from(value: NodeRecord) -> Self {
        Self::Record(value)
    }
}
