mod filter;
use filter::Filter;

use crate::{merge, DocumentQuery, Projection, Single};

use bson::Document;
use sieve_core::{
    dispatch::{NodeKind, Registry},
    driver::{self, CannotPushDown},
    schema::Schema,
    stmt::{AggregateOp, Node, NodeContext, NodeId, NodeLiteral, Request, Type},
};

use std::sync::LazyLock;

type Lowered<T> = Result<T, CannotPushDown>;

/// Node kinds a find can express. Arithmetic, aggregates other than `len`, grouping and
/// de-duplication stay in the interpreter.
static SUPPORTED: LazyLock<Registry<()>> = LazyLock::new(|| {
    [
        NodeKind::Source,
        NodeKind::Literal,
        NodeKind::Context,
        NodeKind::Attribute,
        NodeKind::Record,
        NodeKind::Not,
        NodeKind::Comparison,
        NodeKind::Logical,
        NodeKind::Matches,
        NodeKind::Filter,
        NodeKind::Map,
        NodeKind::Sort,
        NodeKind::Slice,
        NodeKind::Index,
        NodeKind::One,
        NodeKind::Len,
    ]
    .into_iter()
    .map(|kind| (kind, ()))
    .collect()
});

/// Translates requests into finds on a document store.
#[derive(Debug, Clone, Default)]
pub struct Compiler {}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {}
    }
}

impl driver::Compiler for Compiler {
    type Fragment = DocumentQuery;

    fn supports(&self, request: &Request, id: NodeId) -> bool {
        SUPPORTED.supports(request, id) && filter::translatable(request, id)
    }

    fn compile(&self, schema: &Schema, request: &Request) -> Lowered<DocumentQuery> {
        if let Err(err) = request.infer_ty(schema, &[]) {
            return Err(CannotPushDown::new(request.root(), err.to_string()));
        }

        let query = Lower { request, schema }.root()?;
        tracing::debug!(%query, "compiled request");
        Ok(query)
    }
}

struct Lower<'a> {
    request: &'a Request,
    schema: &'a Schema,
}

fn refuse(id: NodeId, reason: impl Into<String>) -> CannotPushDown {
    CannotPushDown::new(id, reason)
}

impl Lower<'_> {
    fn root(&self) -> Lowered<DocumentQuery> {
        let request = self.request;
        let root = request.root();

        match request.node(root) {
            Node::Aggregate(node) if node.op == AggregateOp::Len && self.ty(node.subject)?.is_list() => {
                let mut query = self.find(node.subject)?;
                query.count = true;
                Ok(query)
            }
            Node::One(node) => {
                let default = match node.default {
                    None => None,
                    Some(default) => match request.node(default) {
                        Node::Literal(NodeLiteral { value }) => Some(value.clone()),
                        _ => return Err(refuse(default, "defaults must be literals")),
                    },
                };
                let mut query = self.find(node.subject)?;
                query.single = Some(Single::One {
                    default,
                    context: format!("one() over {}", request.with_root(node.subject)),
                });
                Ok(query)
            }
            Node::Index(node) => {
                if node.index < 0 {
                    return Err(refuse(root, "negative indices"));
                }
                let mut query = self.find(node.subject)?;
                query.single = Some(Single::Index(node.index as u64));
                Ok(query)
            }
            _ => self.find(root),
        }
    }

    /// Lowers the list-typed chain at `id`.
    fn find(&self, id: NodeId) -> Lowered<DocumentQuery> {
        let request = self.request;

        match request.node(id) {
            Node::Source(node) => {
                if self.schema.collection(&node.name).is_none() {
                    return Err(refuse(id, format!("unknown source `{}`", node.name)));
                }
                Ok(DocumentQuery::new(&node.name))
            }
            Node::Filter(node) => {
                let mut query = self.find(node.subject)?;
                self.check_reorderable(id, &query, "filter")?;

                let item = self.item_ty(node.subject)?;
                let filter = Filter::new(request, self.schema, item).lower(node.predicate)?;
                query.filter = merge::and(std::mem::take(&mut query.filter), filter);
                Ok(query)
            }
            Node::Sort(node) => {
                let mut query = self.find(node.subject)?;
                self.check_reorderable(id, &query, "sort")?;

                let mut sort = Document::new();
                for key in &node.keys {
                    let Some(path) = field_path(request, key.key) else {
                        return Err(refuse(key.key, "sort keys must be fields"));
                    };
                    if !sort.contains_key(&path) {
                        sort.insert(path, if key.descending { -1 } else { 1 });
                    }
                }
                // Earlier keys only break ties.
                for (path, direction) in std::mem::take(&mut query.sort) {
                    if !sort.contains_key(&path) {
                        sort.insert(path, direction);
                    }
                }
                query.sort = sort;
                Ok(query)
            }
            Node::Slice(node) => {
                if !node.is_forward() {
                    return Err(refuse(id, "slices with negative bounds"));
                }
                let mut query = self.find(node.subject)?;
                query.slice(node.start, node.stop);
                Ok(query)
            }
            Node::Map(node) => {
                let mut query = self.find(node.subject)?;
                if query.projection.is_some() {
                    return Err(refuse(id, "map over a projection"));
                }
                query.projection = match self.projection(node.transform)? {
                    Projection::Element => None,
                    projection => Some(projection),
                };
                Ok(query)
            }
            _ => Err(refuse(id, "not expressible as a find")),
        }
    }

    fn check_reorderable(&self, id: NodeId, query: &DocumentQuery, what: &str) -> Lowered<()> {
        if query.projection.is_some() {
            return Err(refuse(id, format!("{what} over a projection")));
        }
        if query.is_windowed() {
            return Err(refuse(id, format!("{what} after skip or limit")));
        }
        Ok(())
    }

    fn projection(&self, id: NodeId) -> Lowered<Projection> {
        let request = self.request;
        match request.node(id) {
            Node::Context(NodeContext { up: 0 }) => Ok(Projection::Element),
            Node::Attribute(_) => field_path(request, id)
                .map(Projection::Field)
                .ok_or_else(|| refuse(id, "projections only read fields of the element")),
            Node::Record(node) => node
                .fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), self.projection(*field)?)))
                .collect::<Lowered<_>>()
                .map(Projection::Record),
            _ => Err(refuse(id, "projections only read fields of the element")),
        }
    }

    fn ty(&self, id: NodeId) -> Lowered<Type> {
        self.request
            .infer_node_ty(id, self.schema, &[])
            .map_err(|err| refuse(id, err.to_string()))
    }

    fn item_ty(&self, id: NodeId) -> Lowered<Type> {
        self.ty(id)?
            .as_item()
            .cloned()
            .ok_or_else(|| refuse(id, "expected a list"))
    }
}

/// The dotted path of `ctx(0).a.b`, if `id` is one.
pub(crate) fn field_path(request: &Request, id: NodeId) -> Option<String> {
    match request.node(id) {
        Node::Attribute(node) => {
            if node.name.is_empty() || node.name.contains('.') || node.name.starts_with('$') {
                return None;
            }
            match request.node(node.subject) {
                Node::Context(NodeContext { up: 0 }) => Some(node.name.clone()),
                _ => field_path(request, node.subject).map(|path| format!("{path}.{}", node.name)),
            }
        }
        _ => None,
    }
}
