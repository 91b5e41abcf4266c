use crate::stmt::{BinaryOp, Node, NodeBinaryOp, NodeId, NodeLiteral, Request, Value};

use indexmap::IndexMap;

/// A predicate seen as field bindings plus whatever else it checks.
///
/// The predicate holds for an element exactly when every binding holds (`element.name == value`)
/// and the remainder holds.
#[derive(Debug, Clone)]
pub struct Isolated {
    pub bindings: IndexMap<String, Value>,
    pub remainder: Request,
}

impl Isolated {
    /// Returns `true` if the predicate can never hold.
    pub fn is_unsatisfiable(&self) -> bool {
        self.remainder.is_literal_false()
    }

    /// Returns the bound values of `fields`, in order, if every one of them is bound.
    pub fn pinned<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Option<Vec<Value>> {
        fields
            .into_iter()
            .map(|field| self.bindings.get(field).cloned())
            .collect()
    }
}

/// Extracts `ctx(0).name == literal` conjuncts from `predicate`.
///
/// Equalities are recognized in either operand order and through nested `and`. Two bindings of
/// the same field to different values make the predicate unsatisfiable: the bindings are then
/// empty and the remainder is `Literal(false)`. Without other conjuncts the remainder is
/// `Literal(true)`.
pub fn isolate(predicate: &Request) -> Isolated {
    let mut bindings = IndexMap::new();
    let mut rest = vec![];
    let mut conflict = false;
    collect(predicate, predicate.root(), &mut bindings, &mut rest, &mut conflict);

    if conflict {
        return Isolated {
            bindings: IndexMap::new(),
            remainder: Request::literal(false),
        };
    }

    let remainder = match rest.split_first() {
        None => Request::literal(true),
        Some((&first, others)) if others.is_empty() => predicate.with_root(first),
        Some((&first, others)) => {
            let mut request = predicate.clone();
            let root = others.iter().fold(first, |lhs, &rhs| {
                request.push(NodeBinaryOp {
                    op: BinaryOp::And,
                    lhs,
                    rhs,
                })
            });
            request.with_root(root)
        }
    };

    Isolated {
        bindings,
        remainder,
    }
}

fn collect(
    request: &Request,
    id: NodeId,
    bindings: &mut IndexMap<String, Value>,
    rest: &mut Vec<NodeId>,
    conflict: &mut bool,
) {
    let Node::BinaryOp(node) = request.node(id) else {
        rest.push(id);
        return;
    };

    match node.op {
        BinaryOp::And => {
            collect(request, node.lhs, bindings, rest, conflict);
            collect(request, node.rhs, bindings, rest, conflict);
        }
        BinaryOp::Eq => {
            let binding = binding(request, node.lhs, node.rhs)
                .or_else(|| binding(request, node.rhs, node.lhs));
            let Some((name, value)) = binding else {
                rest.push(id);
                return;
            };
            match bindings.get(name) {
                Some(bound) if !bound.is_eq(value) => *conflict = true,
                Some(_) => {}
                None => {
                    bindings.insert(name.to_string(), value.clone());
                }
            }
        }
        _ => rest.push(id),
    }
}

/// Matches `ctx(0).name` against `field` and a literal against `literal`.
fn binding<'a>(
    request: &'a Request,
    field: NodeId,
    literal: NodeId,
) -> Option<(&'a str, &'a Value)> {
    let Node::Attribute(attribute) = request.node(field) else {
        return None;
    };
    let Node::Context(context) = request.node(attribute.subject) else {
        return None;
    };
    let Node::Literal(NodeLiteral { value }) = request.node(literal) else {
        return None;
    };
    (context.up == 0).then_some((&attribute.name[..], value))
}
