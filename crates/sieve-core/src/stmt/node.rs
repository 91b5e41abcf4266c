use super::*;

use std::fmt;

/// Position of a node inside a request's arena.
///
/// Ids are stable: rewriting a request only appends nodes, so an id taken from a request stays
/// valid in every request derived from it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single node of a request tree. Children are referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A named collection
    Source(NodeSource),

    /// A constant value
    Literal(NodeLiteral),

    /// The element of an enclosing scope
    Context(NodeContext),

    /// Field access on a mapping
    Attribute(NodeAttribute),

    /// Unary operation
    UnaryOp(NodeUnaryOp),

    /// Binary operation
    BinaryOp(NodeBinaryOp),

    /// A mapping built from named sub-requests
    Record(NodeRecord),

    Filter(NodeFilter),

    Map(NodeMap),

    Sort(NodeSort),

    Slice(NodeSlice),

    Index(NodeIndex),

    Groupby(NodeGroupby),

    Distinct(NodeDistinct),

    One(NodeOne),

    /// `len`, `sum`, `min` or `max` over a sequence
    Aggregate(NodeAggregate),
}

impl Node {
    /// The node's subject, the input of the operation along the chain.
    ///
    /// For binary operations this is the left operand. Sources, literals, context references and
    /// records have no subject.
    pub fn subject(&self) -> Option<NodeId> {
        match self {
            Node::Source(_) | Node::Literal(_) | Node::Context(_) | Node::Record(_) => None,
            Node::Attribute(node) => Some(node.subject),
            Node::UnaryOp(node) => Some(node.subject),
            Node::BinaryOp(node) => Some(node.lhs),
            Node::Filter(node) => Some(node.subject),
            Node::Map(node) => Some(node.subject),
            Node::Sort(node) => Some(node.subject),
            Node::Slice(node) => Some(node.subject),
            Node::Index(node) => Some(node.subject),
            Node::Groupby(node) => Some(node.subject),
            Node::Distinct(node) => Some(node.subject),
            Node::One(node) => Some(node.subject),
            Node::Aggregate(node) => Some(node.subject),
        }
    }

    /// Calls `f` for every child with the number of scopes the child is evaluated under,
    /// relative to this node (`0` or `1`).
    pub fn for_each_child(&self, mut f: impl FnMut(NodeId, usize)) {
        match self {
            Node::Source(_) | Node::Literal(_) | Node::Context(_) => {}
            Node::Attribute(node) => f(node.subject, 0),
            Node::UnaryOp(node) => f(node.subject, 0),
            Node::BinaryOp(node) => {
                f(node.lhs, 0);
                f(node.rhs, 0);
            }
            Node::Record(node) => {
                for field in node.fields.values() {
                    f(*field, 0);
                }
            }
            Node::Filter(node) => {
                f(node.subject, 0);
                f(node.predicate, 1);
            }
            Node::Map(node) => {
                f(node.subject, 0);
                f(node.transform, 1);
            }
            Node::Sort(node) => {
                f(node.subject, 0);
                for key in &node.keys {
                    f(key.key, 1);
                }
            }
            Node::Slice(node) => f(node.subject, 0),
            Node::Index(node) => f(node.subject, 0),
            Node::Groupby(node) => {
                f(node.subject, 0);
                f(node.key, 1);
                for aggregate in node.aggregates.values() {
                    f(*aggregate, 1);
                }
            }
            Node::Distinct(node) => f(node.subject, 0),
            Node::One(node) => {
                f(node.subject, 0);
                if let Some(default) = node.default {
                    f(default, 0);
                }
            }
            Node::Aggregate(node) => f(node.subject, 0),
        }
    }

    /// Returns a copy of the node with every child replaced by `f(child, scopes)`.
    pub fn map_children(&self, mut f: impl FnMut(NodeId, usize) -> NodeId) -> Node {
        let mut node = self.clone();
        match &mut node {
            Node::Source(_) | Node::Literal(_) | Node::Context(_) => {}
            Node::Attribute(node) => node.subject = f(node.subject, 0),
            Node::UnaryOp(node) => node.subject = f(node.subject, 0),
            Node::BinaryOp(node) => {
                node.lhs = f(node.lhs, 0);
                node.rhs = f(node.rhs, 0);
            }
            Node::Record(node) => {
                for field in node.fields.values_mut() {
                    *field = f(*field, 0);
                }
            }
            Node::Filter(node) => {
                node.subject = f(node.subject, 0);
                node.predicate = f(node.predicate, 1);
            }
            Node::Map(node) => {
                node.subject = f(node.subject, 0);
                node.transform = f(node.transform, 1);
            }
            Node::Sort(node) => {
                node.subject = f(node.subject, 0);
                for key in &mut node.keys {
                    key.key = f(key.key, 1);
                }
            }
            Node::Slice(node) => node.subject = f(node.subject, 0),
            Node::Index(node) => node.subject = f(node.subject, 0),
            Node::Groupby(node) => {
                node.subject = f(node.subject, 0);
                node.key = f(node.key, 1);
                for aggregate in node.aggregates.values_mut() {
                    *aggregate = f(*aggregate, 1);
                }
            }
            Node::Distinct(node) => node.subject = f(node.subject, 0),
            Node::One(node) => {
                node.subject = f(node.subject, 0);
                node.default = node.default.map(|default| f(default, 0));
            }
            Node::Aggregate(node) => node.subject = f(node.subject, 0),
        }
        node
    }

    /// Returns a copy of the node with its subject replaced.
    pub fn with_subject(&self, subject: NodeId) -> Node {
        if self.subject().is_none() {
            return self.clone();
        }

        // The subject is always the first child visited.
        let mut first = true;
        self.map_children(|child, _| {
            if std::mem::take(&mut first) {
                subject
            } else {
                child
            }
        })
    }

    /// Compares everything but the children.
    pub(crate) fn shallow_eq(&self, other: &Node) -> bool {
        let placeholder = |_, _| NodeId(0);
        self.map_children(placeholder) == other.map_children(placeholder)
    }
}
