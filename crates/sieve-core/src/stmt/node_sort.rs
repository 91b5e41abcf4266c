use super::{Node, NodeId, Request};

/// Orders the subject by a list of keys, most significant first.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSort {
    pub subject: NodeId,
    pub keys: Vec<NodeSortKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSortKey {
    /// Evaluated with the element bound to `ctx(0)`.
    pub key: NodeId,
    pub descending: bool,
}

/// A sort key handed to [`Request::sort`].
#[derive(Debug, Clone)]
pub struct SortKey {
    pub key: Request,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(key: impl Into<Request>) -> SortKey {
        SortKey {
            key: key.into(),
            descending: false,
        }
    }

    pub fn desc(key: impl Into<Request>) -> SortKey {
        SortKey {
            key: key.into(),
            descending: true,
        }
    }
}

impl NodeSort {
    /// Returns `true` when some keys ascend and others descend.
    pub fn is_mixed(&self) -> bool {
        self.keys
            .windows(2)
            .any(|pair| pair[0].descending != pair[1].descending)
    }
}

impl Request {
    pub fn sort(mut self, keys: impl IntoIterator<Item = SortKey>) -> Request {
        let keys = keys
            .into_iter()
            .map(|key| NodeSortKey {
                key: self.import(&key.key),
                descending: key.descending,
            })
            .collect();
        self.wrap(|subject| NodeSort { subject, keys }.into())
    }

    /// Sorts ascending by a single key.
    pub fn sort_by(self, key: impl Into<Request>) -> Request {
        self.sort([SortKey::asc(key)])
    }
}

impl From<NodeSort> for Node {
    fn from(value: NodeSort) -> Self {
        Self::Sort(value)
    }
}
