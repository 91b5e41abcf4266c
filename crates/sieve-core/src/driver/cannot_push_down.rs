use crate::stmt::NodeId;

use std::fmt;

/// A node a backend cannot express.
///
/// Compilers return it instead of failing so the executor can run the part of the request below
/// `node` on the backend and interpret the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannotPushDown {
    pub node: NodeId,
    pub reason: String,
}

impl CannotPushDown {
    pub fn new(node: NodeId, reason: impl Into<String>) -> CannotPushDown {
        CannotPushDown {
            node,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CannotPushDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot push down {:?}: {}", self.node, self.reason)
    }
}
