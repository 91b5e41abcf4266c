use super::{AggregateOp, Node, NodeId, Request};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAggregate {
    pub op: AggregateOp,
    pub subject: NodeId,
}

impl Request {
    pub fn aggregate(self, op: AggregateOp) -> Request {
        self.wrap(|subject| NodeAggregate { op, subject }.into())
    }

    pub fn len(self) -> Request {
        self.aggregate(AggregateOp::Len)
    }

    pub fn sum(self) -> Request {
        self.aggregate(AggregateOp::Sum)
    }

    pub fn min(self) -> Request {
        self.aggregate(AggregateOp::Min)
    }

    pub fn max(self) -> Request {
        self.aggregate(AggregateOp::Max)
    }
}

impl From<NodeAggregate> for Node {
    fn from(value: NodeAggregate) -> Self {
        Self::Aggregate(value)
    }
}
