use super::{Node, Request};

/// Reference to the element of an enclosing scope.
///
/// Scopes are pushed by the operands of `filter`, `map`, `sort` and `groupby`. `ctx(0)` is the
/// element currently being processed, `ctx(-1)` the element of the scope around it, and so on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeContext {
    /// Number of scopes to walk outwards from the innermost one.
    pub up: usize,
}

impl NodeContext {
    /// The depth as written by users: zero or negative.
    pub fn depth(self) -> i64 {
        -(self.up as i64)
    }
}

impl Request {
    /// A reference to the element at scope `depth`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is positive.
    #[track_caller]
    pub fn context(depth: i64) -> Request {
        assert!(
            depth <= 0,
            "context depth must be zero or negative; depth={depth}"
        );
        Request::from_node(NodeContext {
            up: depth.unsigned_abs() as usize,
        })
    }
}

/// `ctx(0)`: the element currently being processed.
pub fn ctx() -> Request {
    Request::context(0)
}

/// The element `up` scopes outwards from the innermost one, `ctx(-up)`.
pub fn ctx_up(up: usize) -> Request {
    Request::from_node(NodeContext { up })
}

impl From<NodeContext> for Node {
    fn from(value: NodeContext) -> Self {
        Self::Context(value)
    }
}
