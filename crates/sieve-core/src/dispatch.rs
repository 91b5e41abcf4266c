mod node_kind;
pub use node_kind::NodeKind;

use crate::{
    stmt::{NodeId, Request},
    Error, Result,
};

use std::collections::HashMap;

/// A table of handlers keyed by node kind.
///
/// Lookups walk from a node's own kind to its ancestors, so a handler registered for
/// [`NodeKind::Comparison`] serves every comparison operator that has no handler of its own.
/// Each behavior attached to requests owns its own registry.
#[derive(Debug, Clone)]
pub struct Registry<H> {
    handlers: HashMap<NodeKind, H>,
}

impl<H> Registry<H> {
    pub fn new() -> Registry<H> {
        Registry {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `kind`, returning the handler it replaces.
    pub fn register(&mut self, kind: NodeKind, handler: H) -> Option<H> {
        self.handlers.insert(kind, handler)
    }

    /// Builder form of [`Registry::register`].
    pub fn with(mut self, kind: NodeKind, handler: H) -> Registry<H> {
        self.register(kind, handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The most specific handler for `kind`, and the kind it was registered under.
    pub fn resolve_kind(&self, kind: NodeKind) -> Option<(NodeKind, &H)> {
        kind.ancestors()
            .find_map(|kind| self.handlers.get(&kind).map(|handler| (kind, handler)))
    }

    /// The handler for the node at `id`.
    pub fn resolve(&self, request: &Request, id: NodeId) -> Result<&H> {
        let kind = NodeKind::of(request.node(id));
        match self.resolve_kind(kind) {
            Some((_, handler)) => Ok(handler),
            None => Err(Error::unhandled_node_type(kind.to_string())),
        }
    }

    /// The first node reachable from `id`, in pre-order, that resolves to no handler.
    pub fn find_unhandled(&self, request: &Request, id: NodeId) -> Option<NodeId> {
        let mut unhandled = None;
        request.walk(id, &mut |id, node, _| {
            if unhandled.is_none() && self.resolve_kind(NodeKind::of(node)).is_none() {
                unhandled = Some(id);
            }
        });
        unhandled
    }

    /// Returns `true` if every node reachable from `id` resolves to a handler.
    pub fn supports(&self, request: &Request, id: NodeId) -> bool {
        self.find_unhandled(request, id).is_none()
    }
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Registry::new()
    }
}

impl<H> FromIterator<(NodeKind, H)> for Registry<H> {
    fn from_iter<T: IntoIterator<Item = (NodeKind, H)>>(iter: T) -> Self {
        Registry {
            handlers: iter.into_iter().collect(),
        }
    }
}
