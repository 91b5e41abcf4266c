use super::{Capability, Shape};
use crate::{
    stmt::{self, ColumnType, Expr, Func, OrderByExpr, Select, SelectColumn, TableAlias},
    Cardinality, Layout,
};

use sieve_core::{
    driver::CannotPushDown,
    schema::Schema,
    stmt::{
        AggregateOp, BinaryOp, Node, NodeAggregate, NodeBinaryOp, NodeGroupby, NodeId,
        NodeLiteral, Pattern, Request, Type, UnaryOp, Value,
    },
};

use indexmap::IndexMap;

type Lowered<T> = Result<T, CannotPushDown>;

/// Lowers one request into a `SELECT`.
pub(super) struct Lower<'a> {
    request: &'a Request,
    schema: &'a Schema,
    capability: Capability,

    /// What each enclosing scope binds, outermost first.
    scopes: Vec<Binding>,

    /// Number of table aliases handed out so far.
    aliases: usize,
}

#[derive(Debug, Clone)]
enum Binding {
    /// An element, read from the current row
    Element { shape: Shape, ty: Type },

    /// The members of a group, inside the aggregates of a groupby
    Group { member: Shape, ty: Type },
}

/// A list under construction: the rows of `select`, read through `shape`.
#[derive(Debug)]
struct Rel {
    select: Select,
    shape: Shape,

    /// Type of one element
    item: Type,
}

impl Binding {
    fn ty(&self) -> Type {
        match self {
            Binding::Element { ty, .. } => ty.clone(),
            Binding::Group { ty, .. } => Type::list(ty.clone()),
        }
    }
}

impl Rel {
    /// Returns `true` if rows can still be filtered or reordered in place.
    fn is_open(&self) -> bool {
        self.select.is_unbounded() && !self.select.distinct
    }
}

fn refuse(id: NodeId, reason: impl Into<String>) -> CannotPushDown {
    CannotPushDown::new(id, reason)
}

impl<'a> Lower<'a> {
    pub(super) fn new(request: &'a Request, schema: &'a Schema, capability: Capability) -> Self {
        Lower {
            request,
            schema,
            capability,
            scopes: vec![],
            aliases: 0,
        }
    }

    pub(super) fn root(mut self) -> Lowered<(Select, Layout, Cardinality)> {
        let request = self.request;
        let root = request.root();

        if let Node::One(node) = request.node(root) {
            let default = match node.default {
                None => None,
                Some(default) => match request.node(default) {
                    Node::Literal(NodeLiteral { value }) => Some(value.clone()),
                    _ => return Err(refuse(default, "defaults must be literals")),
                },
            };
            let mut rel = self.rel(node.subject)?;
            // A second row is enough to detect multiple results.
            rel.select.slice(None, Some(2));
            let cardinality = Cardinality::One {
                default,
                context: format!("one() over {}", request.with_root(node.subject)),
            };
            return project(root, rel.select, &rel.shape, cardinality);
        }

        if self.ty(root)?.is_list() {
            let rel = self.rel(root)?;
            return project(root, rel.select, &rel.shape, Cardinality::List);
        }

        let shape = self.shape(root)?;
        project(root, Select::default(), &shape, Cardinality::Value)
    }

    fn rel(&mut self, id: NodeId) -> Lowered<Rel> {
        let request = self.request;

        match request.node(id) {
            Node::Source(node) => {
                let Some(collection) = self.schema.collection(&node.name) else {
                    return Err(refuse(id, format!("unknown source `{}`", node.name)));
                };
                let alias = self.alias();
                let shape = Shape::Mapping(
                    collection
                        .fields
                        .iter()
                        .map(|(name, ty)| {
                            let field = if ty.is_scalar() {
                                Shape::Scalar(Expr::column(alias, name), ty.clone())
                            } else {
                                Shape::Opaque(ty.clone())
                            };
                            (name.clone(), field)
                        })
                        .collect(),
                );
                Ok(Rel {
                    select: Select::from_table(&node.name, alias),
                    shape,
                    item: collection.item_ty(),
                })
            }
            Node::Filter(node) => {
                let mut rel = self.rel(node.subject)?;
                if !rel.is_open() {
                    rel = self.wrap(id, rel)?;
                }
                let predicate = self.within(&rel, |lower| lower.scalar(node.predicate))?;
                rel.select.filter.push(predicate);
                Ok(rel)
            }
            Node::Map(node) => {
                let mut rel = self.rel(node.subject)?;
                if rel.select.distinct {
                    rel = self.wrap(id, rel)?;
                }
                rel.shape = self.within(&rel, |lower| lower.shape(node.transform))?;
                rel.item = self.item_ty(id)?;
                Ok(rel)
            }
            Node::Sort(node) => {
                let mut rel = self.rel(node.subject)?;
                if !rel.is_open() {
                    rel = self.wrap(id, rel)?;
                }
                let mut order_by = vec![];
                for key in &node.keys {
                    let expr = self.within(&rel, |lower| lower.scalar(key.key))?;
                    order_by.push(OrderByExpr {
                        expr,
                        descending: key.descending,
                    });
                }
                // A stable sort keeps the previous order among equal keys.
                order_by.append(&mut rel.select.order_by);
                rel.select.order_by = order_by;
                Ok(rel)
            }
            Node::Slice(node) => {
                if !node.is_forward() {
                    return Err(refuse(id, "slices with negative bounds"));
                }
                let mut rel = self.rel(node.subject)?;
                rel.select.slice(node.start, node.stop);
                Ok(rel)
            }
            Node::Distinct(node) => {
                let mut rel = self.rel(node.subject)?;
                if !rel.select.is_unbounded() {
                    rel = self.wrap(id, rel)?;
                }
                if !rel.select.order_by.is_empty() {
                    return Err(refuse(id, "distinct over an ordered select"));
                }
                rel.select.distinct = true;
                Ok(rel)
            }
            Node::Groupby(node) => self.groupby(id, node),
            _ => Err(refuse(id, "not a relation")),
        }
    }

    fn groupby(&mut self, id: NodeId, node: &NodeGroupby) -> Lowered<Rel> {
        if node.aggregates.is_empty() {
            return Err(refuse(id, "groups without aggregates are lists inside mappings"));
        }

        let mut rel = self.rel(node.subject)?;
        if !rel.is_open() {
            rel = self.wrap(id, rel)?;
        }

        let key = self.within(&rel, |lower| lower.shape(node.key))?;
        let mut group_by = vec![];
        key.columns(&mut group_by)
            .map_err(|reason| refuse(node.key, reason))?;

        self.scopes.push(Binding::Group {
            member: rel.shape.clone(),
            ty: rel.item.clone(),
        });
        let aggregates = node
            .aggregates
            .iter()
            .map(|(name, aggregate)| Ok((name.clone(), self.shape(*aggregate)?)))
            .collect::<Lowered<Vec<_>>>();
        self.scopes.pop();

        let mut fields = IndexMap::new();
        fields.insert("key".to_string(), key);
        fields.extend(aggregates?);

        let mut select = rel.select;
        select.order_by.clear();
        select.group_by = group_by;

        let grouped = Rel {
            select,
            shape: Shape::Mapping(fields),
            item: self.item_ty(id)?,
        };
        // Groups are read from a derived table so later operators see plain columns.
        self.wrap(id, grouped)
    }

    /// Turns `rel` into a derived table read by a fresh select.
    ///
    /// The order of `rel` is kept through hidden `o{n}` columns.
    fn wrap(&mut self, at: NodeId, rel: Rel) -> Lowered<Rel> {
        let Rel {
            mut select,
            shape,
            item,
        } = rel;

        select.columns = shape.select_columns().map_err(|reason| refuse(at, reason))?;

        let alias = self.alias();
        let mut order_by = vec![];
        for (i, order) in select.order_by.iter().enumerate() {
            let hidden = format!("o{i}");
            select.columns.push(SelectColumn {
                expr: order.expr.clone(),
                alias: hidden.clone(),
            });
            order_by.push(OrderByExpr {
                expr: Expr::column(alias, hidden),
                descending: order.descending,
            });
        }

        let shape = shape.rebase(alias);
        let mut outer = Select::from_derived(select, alias);
        outer.order_by = order_by;

        Ok(Rel {
            select: outer,
            shape,
            item,
        })
    }

    /// Lowers a non-list node.
    fn shape(&mut self, id: NodeId) -> Lowered<Shape> {
        let request = self.request;
        let ty = self.ty(id)?;

        if ty.is_list() {
            return self.array(id, ty);
        }

        match request.node(id) {
            Node::Literal(node) => literal(id, &node.value),
            Node::Context(node) => match self.binding(id, node.up)? {
                Binding::Element { shape, .. } => Ok(shape.clone()),
                Binding::Group { .. } => Err(refuse(id, "group used outside of an aggregate")),
            },
            Node::Attribute(node) => match self.shape(node.subject)? {
                Shape::Mapping(mut fields) => fields
                    .shift_remove(&node.name)
                    .ok_or_else(|| refuse(id, format!("no field `{}`", node.name))),
                _ => Err(refuse(id, "field of a value stored in one column")),
            },
            Node::Record(node) => {
                let mut fields = IndexMap::new();
                for (name, field) in &node.fields {
                    fields.insert(name.clone(), self.shape(*field)?);
                }
                Ok(Shape::Mapping(fields))
            }
            Node::UnaryOp(node) => {
                let operand = Box::new(self.scalar(node.subject)?);
                let expr = match node.op {
                    UnaryOp::Not => Expr::Not(operand),
                    UnaryOp::Neg => Expr::Neg(operand),
                };
                Ok(Shape::Scalar(expr, ty))
            }
            Node::BinaryOp(node) => self.binary_op(id, node, ty),
            Node::Aggregate(node) => self.aggregate(id, node, ty),
            Node::One(_) | Node::Index(_) => {
                Err(refuse(id, "single elements are only selected at the top level"))
            }
            _ => Err(refuse(id, "unsupported expression")),
        }
    }

    /// Lowers a node read from a single column.
    fn scalar(&mut self, id: NodeId) -> Lowered<Expr> {
        match self.shape(id)? {
            Shape::Scalar(expr, _) => Ok(expr),
            _ => Err(refuse(id, "expected a single column")),
        }
    }

    fn binary_op(&mut self, id: NodeId, node: &NodeBinaryOp, ty: Type) -> Lowered<Shape> {
        let op = match node.op {
            BinaryOp::And | BinaryOp::Or => {
                let operands = vec![self.scalar(node.lhs)?, self.scalar(node.rhs)?];
                let expr = if node.op == BinaryOp::And {
                    Expr::And(operands)
                } else {
                    Expr::Or(operands)
                };
                return Ok(Shape::Scalar(expr, ty));
            }
            BinaryOp::Matches => return self.matches(id, node),
            BinaryOp::Add if ty.is_mapping() => {
                return match (self.shape(node.lhs)?, self.shape(node.rhs)?) {
                    (Shape::Mapping(mut lhs), Shape::Mapping(rhs)) => {
                        lhs.extend(rhs);
                        Ok(Shape::Mapping(lhs))
                    }
                    _ => Err(refuse(id, "merge of values stored in one column")),
                };
            }
            BinaryOp::Add if ty.is_string() => stmt::BinaryOp::Concat,
            BinaryOp::Add => stmt::BinaryOp::Add,
            BinaryOp::Sub => stmt::BinaryOp::Sub,
            BinaryOp::Mul => stmt::BinaryOp::Mul,
            BinaryOp::Div => stmt::BinaryOp::Div,
            BinaryOp::Eq => stmt::BinaryOp::Eq,
            BinaryOp::Ne => stmt::BinaryOp::Ne,
            BinaryOp::Lt => stmt::BinaryOp::Lt,
            BinaryOp::Le => stmt::BinaryOp::Le,
            BinaryOp::Gt => stmt::BinaryOp::Gt,
            BinaryOp::Ge => stmt::BinaryOp::Ge,
        };

        let lhs = self.scalar(node.lhs)?;
        let rhs = self.scalar(node.rhs)?;

        let expr = if op == stmt::BinaryOp::Div {
            // sqlite yields NULL where the interpreter fails
            if !is_nonzero_number(self.request, node.rhs) {
                return Err(refuse(id, "division by a value that may be zero"));
            }
            // True division, whatever the operand types.
            Expr::binary_op(Expr::Cast(Box::new(lhs), ColumnType::Real), op, rhs)
        } else {
            Expr::binary_op(lhs, op, rhs)
        };
        Ok(Shape::Scalar(expr, ty))
    }

    fn matches(&mut self, id: NodeId, node: &NodeBinaryOp) -> Lowered<Shape> {
        let request = self.request;
        let Node::Literal(NodeLiteral {
            value: Value::String(pattern),
        }) = request.node(node.rhs)
        else {
            return Err(refuse(id, "patterns must be literals"));
        };
        let Some(pattern) = Pattern::parse(pattern) else {
            return Err(refuse(id, "only anchored literal patterns are supported"));
        };

        let subject = self.scalar(node.lhs)?;
        let expr = match pattern {
            Pattern::Exact(text) => Expr::binary_op(
                subject,
                stmt::BinaryOp::Eq,
                Expr::Value(Value::from(text)),
            ),
            Pattern::Prefix(prefix) => Expr::BeginsWith(Box::new(subject), prefix.to_string()),
        };
        Ok(Shape::Scalar(expr, Type::Bool))
    }

    fn aggregate(&mut self, id: NodeId, node: &NodeAggregate, ty: Type) -> Lowered<Shape> {
        if let Some(expr) = self.group_aggregate(id, node)? {
            return Ok(Shape::Scalar(expr, ty));
        }

        let subject_ty = self.ty(node.subject)?;
        if subject_ty.is_string() {
            if node.op != AggregateOp::Len {
                return Err(refuse(id, "aggregate over a string"));
            }
            let subject = self.scalar(node.subject)?;
            return Ok(Shape::Scalar(Expr::func(Func::Length, vec![subject]), ty));
        }
        if subject_ty.is_mapping() {
            if let (AggregateOp::Len, Shape::Mapping(fields)) =
                (node.op, self.shape(node.subject)?)
            {
                let len = Value::I64(fields.len() as i64);
                return Ok(Shape::Scalar(Expr::Value(len), ty));
            }
            return Err(refuse(id, "aggregate over a mapping"));
        }

        let mut rel = self.rel(node.subject)?;
        if !rel.is_open() {
            rel = self.wrap(id, rel)?;
        }

        let column = match node.op {
            AggregateOp::Len => Expr::func(Func::Count, vec![]),
            op => {
                let Shape::Scalar(arg, _) = &rel.shape else {
                    return Err(refuse(id, "aggregate over rows of several columns"));
                };
                reduce(op, arg.clone(), None)
            }
        };

        let mut select = rel.select;
        select.order_by.clear();
        select.columns = vec![SelectColumn {
            expr: column,
            alias: "c0".to_string(),
        }];
        Ok(Shape::Scalar(Expr::Subquery(Box::new(select)), ty))
    }

    /// Lowers an aggregate over the members of a group, reached through filters and maps.
    ///
    /// Returns `None` when the aggregate does not read a group.
    fn group_aggregate(&mut self, id: NodeId, node: &NodeAggregate) -> Lowered<Option<Expr>> {
        let request = self.request;

        let mut steps = vec![];
        let mut cursor = node.subject;
        let up = loop {
            match request.node(cursor) {
                Node::Filter(filter) => {
                    steps.push(cursor);
                    cursor = filter.subject;
                }
                Node::Map(map) => {
                    steps.push(cursor);
                    cursor = map.subject;
                }
                Node::Context(context) => break context.up,
                _ => return Ok(None),
            }
        };

        let Binding::Group { member, ty } = self.binding(cursor, up)?.clone() else {
            return Ok(None);
        };

        let mut shape = member;
        let mut item = ty;
        let mut filter = vec![];
        for step in steps.into_iter().rev() {
            match request.node(step) {
                Node::Filter(node) => {
                    let predicate = self.within_element(shape.clone(), item.clone(), |lower| {
                        lower.scalar(node.predicate)
                    })?;
                    filter.push(predicate);
                }
                Node::Map(node) => {
                    shape = self.within_element(shape, item, |lower| lower.shape(node.transform))?;
                    item = self.item_ty(step)?;
                }
                _ => {}
            }
        }

        let filter = (!filter.is_empty()).then(|| Expr::and_all(filter));
        let expr = match (node.op, shape) {
            (AggregateOp::Len, _) => Expr::aggregate(Func::Count, vec![], filter),
            (op, Shape::Scalar(arg, _)) => reduce(op, arg, filter),
            _ => return Err(refuse(id, "aggregate over rows of several columns")),
        };
        Ok(Some(expr))
    }

    /// A list inside a row, as `ARRAY(SELECT ...)`.
    fn array(&mut self, id: NodeId, ty: Type) -> Lowered<Shape> {
        if !self.capability.list_in_mapping {
            return Err(refuse(id, "lists inside mappings"));
        }

        let rel = self.rel(id)?;
        if !matches!(rel.shape, Shape::Scalar(..)) {
            return Err(refuse(id, "lists of mappings inside mappings"));
        }

        let mut select = rel.select;
        select.columns = rel
            .shape
            .select_columns()
            .map_err(|reason| refuse(id, reason))?;
        Ok(Shape::Scalar(Expr::Array(Box::new(select)), ty))
    }

    fn within<T>(&mut self, rel: &Rel, f: impl FnOnce(&mut Self) -> Lowered<T>) -> Lowered<T> {
        self.within_element(rel.shape.clone(), rel.item.clone(), f)
    }

    /// Runs `f` with an element bound to `ctx(0)`.
    fn within_element<T>(
        &mut self,
        shape: Shape,
        ty: Type,
        f: impl FnOnce(&mut Self) -> Lowered<T>,
    ) -> Lowered<T> {
        self.scopes.push(Binding::Element { shape, ty });
        let ret = f(self);
        self.scopes.pop();
        ret
    }

    fn binding(&self, id: NodeId, up: usize) -> Lowered<&Binding> {
        self.scopes
            .len()
            .checked_sub(up + 1)
            .map(|position| &self.scopes[position])
            .ok_or_else(|| refuse(id, "context escapes the request"))
    }

    fn ty(&self, id: NodeId) -> Lowered<Type> {
        let scopes: Vec<_> = self.scopes.iter().map(Binding::ty).collect();
        self.request
            .infer_node_ty(id, self.schema, &scopes)
            .map_err(|err| refuse(id, err.to_string()))
    }

    fn item_ty(&self, id: NodeId) -> Lowered<Type> {
        let ty = self.ty(id)?;
        ty.as_item()
            .cloned()
            .ok_or_else(|| refuse(id, "expected a list"))
    }

    fn alias(&mut self) -> TableAlias {
        let alias = TableAlias(self.aliases);
        self.aliases += 1;
        alias
    }
}

/// Returns `false` when some node under `id` is refused wherever it appears: a pattern that is
/// not an anchored literal, or a divisor that may be zero.
pub(super) fn translatable(request: &Request, id: NodeId) -> bool {
    let mut translatable = true;
    request.walk(id, &mut |_, node, _| {
        if let Node::BinaryOp(node) = node {
            translatable &= match node.op {
                BinaryOp::Matches => Pattern::literal(request, node.rhs).is_some(),
                BinaryOp::Div => is_nonzero_number(request, node.rhs),
                _ => true,
            };
        }
    });
    translatable
}

fn is_nonzero_number(request: &Request, id: NodeId) -> bool {
    matches!(
        request.node(id),
        Node::Literal(NodeLiteral { value })
            if value.as_f64().is_some_and(|v| v != 0.0 && v.is_finite())
    )
}

/// Finishes `select` as the statement for the request rooted at `root`.
fn project(
    root: NodeId,
    mut select: Select,
    shape: &Shape,
    cardinality: Cardinality,
) -> Lowered<(Select, Layout, Cardinality)> {
    let layout = shape.layout().map_err(|reason| refuse(root, reason))?;
    select.columns = shape.select_columns().map_err(|reason| refuse(root, reason))?;
    Ok((select, layout, cardinality))
}

fn literal(id: NodeId, value: &Value) -> Lowered<Shape> {
    match value {
        Value::Mapping(fields) => fields
            .iter()
            .map(|(name, field)| Ok((name.clone(), literal(id, field)?)))
            .collect::<Lowered<_>>()
            .map(Shape::Mapping),
        Value::List(_) => Err(refuse(id, "list literals")),
        scalar => Ok(Shape::Scalar(Expr::Value(scalar.clone()), scalar.infer_ty())),
    }
}

/// `SUM`, `MIN` or `MAX` of `arg`. An empty sum is zero.
fn reduce(op: AggregateOp, arg: Expr, filter: Option<Expr>) -> Expr {
    match op {
        AggregateOp::Sum => Expr::func(
            Func::Coalesce,
            vec![
                Expr::aggregate(Func::Sum, vec![arg], filter),
                Expr::Value(Value::I64(0)),
            ],
        ),
        AggregateOp::Min => Expr::aggregate(Func::Min, vec![arg], filter),
        AggregateOp::Max => Expr::aggregate(Func::Max, vec![arg], filter),
        AggregateOp::Len => Expr::aggregate(Func::Count, vec![], filter),
    }
}
