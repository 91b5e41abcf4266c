use crate::stmt::{AggregateOp, BinaryOp, Node, UnaryOp};

use std::fmt;

/// The kind of a request node, arranged in a hierarchy.
///
/// Concrete kinds are the ones [`NodeKind::of`] returns. Abstract kinds (`Comparison`,
/// `Arithmetic`, `Logical`, `BinaryOp`, `UnaryOp`, `Aggregate`, `Request`) only exist so that a
/// single handler can serve a family of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Request,

    Source,
    Literal,
    Context,
    Attribute,
    Record,

    UnaryOp,
    Not,
    Neg,

    BinaryOp,
    Comparison,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Arithmetic,
    Add,
    Sub,
    Mul,
    Div,
    Logical,
    And,
    Or,
    Matches,

    Filter,
    Map,
    Sort,
    Slice,
    Index,
    Groupby,
    Distinct,
    One,

    Aggregate,
    Len,
    Sum,
    Min,
    Max,
}

impl NodeKind {
    pub fn of(node: &Node) -> NodeKind {
        match node {
            Node::Source(_) => NodeKind::Source,
            Node::Literal(_) => NodeKind::Literal,
            Node::Context(_) => NodeKind::Context,
            Node::Attribute(_) => NodeKind::Attribute,
            Node::Record(_) => NodeKind::Record,
            Node::UnaryOp(node) => match node.op {
                UnaryOp::Not => NodeKind::Not,
                UnaryOp::Neg => NodeKind::Neg,
            },
            Node::BinaryOp(node) => match node.op {
                BinaryOp::Eq => NodeKind::Eq,
                BinaryOp::Ne => NodeKind::Ne,
                BinaryOp::Lt => NodeKind::Lt,
                BinaryOp::Gt => NodeKind::Gt,
                BinaryOp::Le => NodeKind::Le,
                BinaryOp::Ge => NodeKind::Ge,
                BinaryOp::Add => NodeKind::Add,
                BinaryOp::Sub => NodeKind::Sub,
                BinaryOp::Mul => NodeKind::Mul,
                BinaryOp::Div => NodeKind::Div,
                BinaryOp::And => NodeKind::And,
                BinaryOp::Or => NodeKind::Or,
                BinaryOp::Matches => NodeKind::Matches,
            },
            Node::Filter(_) => NodeKind::Filter,
            Node::Map(_) => NodeKind::Map,
            Node::Sort(_) => NodeKind::Sort,
            Node::Slice(_) => NodeKind::Slice,
            Node::Index(_) => NodeKind::Index,
            Node::Groupby(_) => NodeKind::Groupby,
            Node::Distinct(_) => NodeKind::Distinct,
            Node::One(_) => NodeKind::One,
            Node::Aggregate(node) => match node.op {
                AggregateOp::Len => NodeKind::Len,
                AggregateOp::Sum => NodeKind::Sum,
                AggregateOp::Min => NodeKind::Min,
                AggregateOp::Max => NodeKind::Max,
            },
        }
    }

    /// The direct supertype. `Request` is the root and has none.
    pub fn parent(self) -> Option<NodeKind> {
        let parent = match self {
            NodeKind::Request => return None,
            NodeKind::Not | NodeKind::Neg => NodeKind::UnaryOp,
            NodeKind::Eq
            | NodeKind::Ne
            | NodeKind::Lt
            | NodeKind::Gt
            | NodeKind::Le
            | NodeKind::Ge => NodeKind::Comparison,
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div => NodeKind::Arithmetic,
            NodeKind::And | NodeKind::Or => NodeKind::Logical,
            NodeKind::Comparison | NodeKind::Arithmetic | NodeKind::Logical | NodeKind::Matches => {
                NodeKind::BinaryOp
            }
            NodeKind::Len | NodeKind::Sum | NodeKind::Min | NodeKind::Max => NodeKind::Aggregate,
            _ => NodeKind::Request,
        };
        Some(parent)
    }

    /// This kind followed by its supertypes, most specific first.
    pub fn ancestors(self) -> impl Iterator<Item = NodeKind> {
        std::iter::successors(Some(self), |kind| kind.parent())
    }

    /// Returns `true` if `self` is `other` or one of its subtypes.
    pub fn is_a(self, other: NodeKind) -> bool {
        self.ancestors().any(|kind| kind == other)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
