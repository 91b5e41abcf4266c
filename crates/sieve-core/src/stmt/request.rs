use super::*;

use std::{collections::HashMap, fmt, sync::Arc};

/// An immutable request tree.
///
/// Nodes live in an append-only arena shared between a request and everything derived from it.
/// Builder methods consume the request and return a new one whose root wraps the old root.
#[derive(Clone)]
pub struct Request {
    nodes: Arc<Vec<Node>>,
    root: NodeId,
}

impl Request {
    pub(crate) fn from_node(node: impl Into<Node>) -> Request {
        Request {
            nodes: Arc::new(vec![node.into()]),
            root: NodeId(0),
        }
    }

    /// An arena with no nodes. A root must be pushed before the request is used.
    pub(crate) fn empty() -> Request {
        Request {
            nodes: Arc::new(Vec::new()),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this request's arena.
    #[track_caller]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a node to the arena and returns its id. The root is unchanged.
    pub fn push(&mut self, node: impl Into<Node>) -> NodeId {
        let nodes = Arc::make_mut(&mut self.nodes);
        nodes.push(node.into());
        NodeId(nodes.len() - 1)
    }

    /// Returns a request sharing this arena, rooted at `id`.
    pub fn with_root(&self, id: NodeId) -> Request {
        assert!(id.0 < self.nodes.len(), "node {id:?} is not part of this request");
        Request {
            nodes: self.nodes.clone(),
            root: id,
        }
    }

    /// Replaces the root by a node built from the current root.
    pub(crate) fn wrap(mut self, f: impl FnOnce(NodeId) -> Node) -> Request {
        let node = f(self.root);
        self.root = self.push(node);
        self
    }

    /// Copies the nodes reachable from `other`'s root into this arena and returns the id of the
    /// copied root.
    pub fn import(&mut self, other: &Request) -> NodeId {
        if Arc::ptr_eq(&self.nodes, &other.nodes) {
            return other.root;
        }

        let mut copied = HashMap::new();
        self.import_node(other, other.root, &mut copied)
    }

    fn import_node(
        &mut self,
        other: &Request,
        id: NodeId,
        copied: &mut HashMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(id) = copied.get(&id) {
            return *id;
        }

        let node = other
            .node(id)
            .map_children(|child, _| self.import_node(other, child, copied));
        let new_id = self.push(node);
        copied.insert(id, new_id);
        new_id
    }

    /// Builds a node from this request and `other`.
    pub(crate) fn combine(
        mut self,
        other: impl Into<Request>,
        f: impl FnOnce(NodeId, NodeId) -> Node,
    ) -> Request {
        let other = self.import(&other.into());
        let node = f(self.root, other);
        self.root = self.push(node);
        self
    }

    /// The chain of the request, starting at its innermost subject and ending at the root.
    ///
    /// Each entry is the subject of the next one.
    pub fn chain(&self) -> Vec<NodeId> {
        let mut chain = vec![self.root];
        let mut id = self.root;
        while let Some(subject) = self.node(id).subject() {
            chain.push(subject);
            id = subject;
        }
        chain.reverse();
        chain
    }

    /// Calls `f` for every node reachable from `id` in pre-order, with the number of scopes the
    /// node is evaluated under relative to `id`.
    pub fn walk<'a>(&'a self, id: NodeId, f: &mut impl FnMut(NodeId, &'a Node, usize)) {
        self.walk_scoped(id, 0, f);
    }

    fn walk_scoped<'a>(
        &'a self,
        id: NodeId,
        level: usize,
        f: &mut impl FnMut(NodeId, &'a Node, usize),
    ) {
        let node = self.node(id);
        f(id, node, level);
        node.for_each_child(|child, scopes| self.walk_scoped(child, level + scopes, f));
    }

    /// Returns `true` if `needle` is reachable from `id`.
    pub fn contains(&self, id: NodeId, needle: NodeId) -> bool {
        if id == needle {
            return true;
        }

        let mut found = false;
        self.node(id).for_each_child(|child, _| {
            found = found || self.contains(child, needle);
        });
        found
    }

    /// Returns the names of every source reachable from the root, in first-seen order.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources = vec![];
        self.walk(self.root, &mut |_, node, _| {
            if let Node::Source(source) = node {
                if !sources.contains(&&source.name[..]) {
                    sources.push(&source.name[..]);
                }
            }
        });
        sources
    }

    /// Structural equality of the subtrees at `id` and `other_id`.
    pub fn subtree_eq(&self, id: NodeId, other: &Request, other_id: NodeId) -> bool {
        let lhs = self.node(id);
        let rhs = other.node(other_id);

        if !lhs.shallow_eq(rhs) {
            return false;
        }

        let mut lhs_children = vec![];
        lhs.for_each_child(|child, _| lhs_children.push(child));
        let mut rhs_children = vec![];
        rhs.for_each_child(|child, _| rhs_children.push(child));

        lhs_children.len() == rhs_children.len()
            && lhs_children
                .into_iter()
                .zip(rhs_children)
                .all(|(lhs, rhs)| self.subtree_eq(lhs, other, rhs))
    }

    /// Returns the literal value of the root, if it is a literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match self.root_node() {
            Node::Literal(literal) => Some(&literal.value),
            _ => None,
        }
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node(id) {
            Node::Source(node) => f.write_str(&node.name),
            Node::Literal(node) => fmt::Display::fmt(&node.value, f),
            Node::Context(node) => write!(f, "ctx({})", node.depth()),
            Node::Attribute(node) => {
                self.fmt_node(node.subject, f)?;
                write!(f, ".{}", node.name)
            }
            Node::UnaryOp(node) => {
                write!(f, "{}(", node.op)?;
                self.fmt_node(node.subject, f)?;
                f.write_str(")")
            }
            Node::BinaryOp(node) => {
                f.write_str("(")?;
                self.fmt_node(node.lhs, f)?;
                write!(f, " {} ", node.op)?;
                self.fmt_node(node.rhs, f)?;
                f.write_str(")")
            }
            Node::Record(node) => {
                f.write_str("{")?;
                for (i, (name, field)) in node.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: ")?;
                    self.fmt_node(*field, f)?;
                }
                f.write_str("}")
            }
            Node::Filter(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".filter(")?;
                self.fmt_node(node.predicate, f)?;
                f.write_str(")")
            }
            Node::Map(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".map(")?;
                self.fmt_node(node.transform, f)?;
                f.write_str(")")
            }
            Node::Sort(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".sort(")?;
                for (i, key) in node.keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if key.descending {
                        f.write_str("-")?;
                    }
                    self.fmt_node(key.key, f)?;
                }
                f.write_str(")")
            }
            Node::Slice(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str("[")?;
                if let Some(start) = node.start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(stop) = node.stop {
                    write!(f, "{stop}")?;
                }
                f.write_str("]")
            }
            Node::Index(node) => {
                self.fmt_node(node.subject, f)?;
                write!(f, "[{}]", node.index)
            }
            Node::Groupby(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".groupby(")?;
                self.fmt_node(node.key, f)?;
                for (name, aggregate) in &node.aggregates {
                    write!(f, ", {name}=")?;
                    self.fmt_node(*aggregate, f)?;
                }
                f.write_str(")")
            }
            Node::Distinct(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".distinct()")
            }
            Node::One(node) => {
                self.fmt_node(node.subject, f)?;
                f.write_str(".one(")?;
                if let Some(default) = node.default {
                    self.fmt_node(default, f)?;
                }
                f.write_str(")")
            }
            Node::Aggregate(node) => {
                self.fmt_node(node.subject, f)?;
                write!(f, ".{}()", node.op)
            }
        }
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Request) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Request(")?;
        self.fmt_node(self.root, f)?;
        f.write_str(")")
    }
}

impl From<Value> for Request {
    fn from(value: Value) -> Self {
        Request::literal(value)
    }
}

impl From<bool> for Request {
    fn from(value: bool) -> Self {
        Request::literal(value)
    }
}

impl From<i64> for Request {
    fn from(value: i64) -> Self {
        Request::literal(value)
    }
}

impl From<i32> for Request {
    fn from(value: i32) -> Self {
        Request::literal(value)
    }
}

impl From<f64> for Request {
    fn from(value: f64) -> Self {
        Request::literal(value)
    }
}

impl From<&str> for Request {
    fn from(value: &str) -> Self {
        Request::literal(value)
    }
}

impl From<String> for Request {
    fn from(value: String) -> Self {
        Request::literal(value)
    }
}

impl From<&Request> for Request {
    fn from(value: &Request) -> Self {
        value.clone()
    }
}
