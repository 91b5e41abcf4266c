use super::{BinaryOp, Node, NodeId, Request};

use std::ops;

/// A binary operation between two sub-requests.
///
/// # Examples
///
/// ```text
/// ctx(0).price == 100
/// ctx(0).price * ctx(0).quantity
/// ctx(0).name matches "^ab"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBinaryOp {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

impl Request {
    pub fn binary_op(self, op: BinaryOp, rhs: impl Into<Request>) -> Request {
        self.combine(rhs, |lhs, rhs| NodeBinaryOp { op, lhs, rhs }.into())
    }

    pub fn eq(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Ne, rhs)
    }

    pub fn ge(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Ge, rhs)
    }

    pub fn gt(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Gt, rhs)
    }

    pub fn le(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Le, rhs)
    }

    pub fn lt(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Lt, rhs)
    }

    pub fn and(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Or, rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Add, rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Sub, rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Mul, rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(self, rhs: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Div, rhs)
    }

    /// Regular-expression search of `pattern` in the subject string.
    pub fn matches(self, pattern: impl Into<Request>) -> Request {
        self.binary_op(BinaryOp::Matches, pattern)
    }
}

macro_rules! impl_binary_ops {
    ($( $trait:ident :: $method:ident => $op:ident ),* $(,)?) => {
        $(
            impl<T: Into<Request>> ops::$trait<T> for Request {
                type Output = Request;

                fn $method(self, rhs: T) -> Request {
                    self.binary_op(BinaryOp::$op, rhs)
                }
            }
        )*
    };
}

impl_binary_ops! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    BitAnd::bitand => And,
    BitOr::bitor => Or,
}

impl From<NodeBinaryOp> for Node {
    fn from(value: NodeBinaryOp) -> Self {
        Self::BinaryOp(value)
    }
}
