use super::{Node, NodeId, Request, UnaryOp};

use std::ops;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeUnaryOp {
    pub op: UnaryOp,
    pub subject: NodeId,
}

impl Request {
    pub fn unary_op(self, op: UnaryOp) -> Request {
        self.wrap(|subject| NodeUnaryOp { op, subject }.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Request {
        self.unary_op(UnaryOp::Not)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Request {
        self.unary_op(UnaryOp::Neg)
    }
}

impl ops::Not for Request {
    type Output = Request;

    fn not(self) -> Request {
        Request::not(self)
    }
}

impl ops::Neg for Request {
    type Output = Request;

    fn neg(self) -> Request {
        Request::neg(self)
    }
}

impl From<NodeUnaryOp> for Node {
    fn from(value: NodeUnaryOp) -> Self {
        Self::UnaryOp(value)
    }
}
