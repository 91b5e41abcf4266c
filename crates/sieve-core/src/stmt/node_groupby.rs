use super::{Node, NodeId, Request};

use indexmap::IndexMap;

/// Groups the subject by a key.
///
/// The key is evaluated with the element bound to `ctx(0)`. Each aggregate is evaluated with the
/// list of elements of one group bound to `ctx(0)`. Without aggregates every result element is
/// `{"key": key, "group": [elements]}`; with aggregates it is `{"key": key, name: value, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroupby {
    pub subject: NodeId,
    pub key: NodeId,
    pub aggregates: IndexMap<String, NodeId>,
}

impl Request {
    pub fn groupby(self, key: impl Into<Request>) -> Request {
        self.groupby_with(key, Vec::<(String, Request)>::new())
    }

    pub fn groupby_with<K, V>(
        mut self,
        key: impl Into<Request>,
        aggregates: impl IntoIterator<Item = (K, V)>,
    ) -> Request
    where
        K: Into<String>,
        V: Into<Request>,
    {
        let key = self.import(&key.into());
        let aggregates = aggregates
            .into_iter()
            .map(|(name, aggregate)| (name.into(), self.import(&aggregate.into())))
            .collect();
        self.wrap(|subject| {
            NodeGroupby {
                subject,
                key,
                aggregates,
            }
            .into()
        })
    }
}

impl From<NodeGroupby> for Node {
    fn from(value: NodeGroupby) -> Self {
        Self::Groupby(value)
    }
}
