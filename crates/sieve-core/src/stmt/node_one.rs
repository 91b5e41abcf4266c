use super::{Node, NodeId, Request};

/// The single element of the subject.
///
/// An empty subject yields the default when one is given. More than one element is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOne {
    pub subject: NodeId,
    pub default: Option<NodeId>,
}

impl Request {
    pub fn one(self) -> Request {
        self.wrap(|subject| {
            NodeOne {
                subject,
                default: None,
            }
            .into()
        })
    }

    pub fn one_or(self, default: impl Into<Request>) -> Request {
        self.combine(default, |subject, default| {
            NodeOne {
                subject,
                default: Some(default),
            }
            .into()
        })
    }
}

impl From<NodeOne> for Node {
    fn from(value: NodeOne) -> Self {
        Self::One(value)
    }
}
