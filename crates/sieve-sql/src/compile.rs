mod lower;
use lower::Lower;

mod shape;
use shape::Shape;

use crate::{
    serializer::{Flavor, Serializer},
    stmt::Statement,
    Cardinality, Layout,
};

use sieve_core::{
    dispatch::{NodeKind, Registry},
    driver::{self, CannotPushDown, Fragment},
    schema::Schema,
    stmt::{NodeId, Request, Value},
    Result,
};

use std::{any::Any, fmt, sync::LazyLock};

/// Node kinds the relational compiler translates. `Index` is left to the interpreter.
static SUPPORTED: LazyLock<Registry<()>> = LazyLock::new(|| {
    [
        NodeKind::Source,
        NodeKind::Literal,
        NodeKind::Context,
        NodeKind::Attribute,
        NodeKind::Record,
        NodeKind::UnaryOp,
        NodeKind::BinaryOp,
        NodeKind::Filter,
        NodeKind::Map,
        NodeKind::Sort,
        NodeKind::Slice,
        NodeKind::Groupby,
        NodeKind::Distinct,
        NodeKind::One,
        NodeKind::Aggregate,
    ]
    .into_iter()
    .map(|kind| (kind, ()))
    .collect()
});

/// Optional features of a SQL flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Lists can be embedded in a row, as `ARRAY(SELECT ...)`.
    pub list_in_mapping: bool,
}

impl Capability {
    pub fn of(flavor: Flavor) -> Capability {
        Capability {
            list_in_mapping: flavor == Flavor::Postgresql,
        }
    }
}

/// Translates requests into `SELECT` statements.
#[derive(Debug, Clone)]
pub struct Compiler {
    serializer: Serializer,
    capability: Capability,
}

/// A compiled request: the statement text, its parameters, and how to read the rows back.
#[derive(Debug, Clone)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
    pub layout: Layout,
    pub cardinality: Cardinality,
}

impl Compiler {
    pub fn new(flavor: Flavor) -> Compiler {
        Compiler {
            serializer: Serializer::new(flavor),
            capability: Capability::of(flavor),
        }
    }

    pub fn sqlite() -> Compiler {
        Compiler::new(Flavor::Sqlite)
    }

    pub fn postgresql() -> Compiler {
        Compiler::new(Flavor::Postgresql)
    }

    pub fn flavor(&self) -> Flavor {
        self.serializer.flavor()
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }
}

impl driver::Compiler for Compiler {
    type Fragment = SqlFragment;

    fn supports(&self, request: &Request, id: NodeId) -> bool {
        SUPPORTED.supports(request, id) && lower::translatable(request, id)
    }

    fn compile(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<SqlFragment, CannotPushDown> {
        // Invalid requests are left to the interpreter, which reports the error.
        if let Err(err) = request.infer_ty(schema, &[]) {
            return Err(CannotPushDown::new(request.root(), err.to_string()));
        }

        let (select, layout, cardinality) = Lower::new(request, schema, self.capability).root()?;

        let mut params = vec![];
        let sql = self
            .serializer
            .serialize(&Statement::Query(select), &mut params);
        tracing::debug!(%sql, params = params.len(), "compiled request");

        Ok(SqlFragment {
            sql,
            params,
            layout,
            cardinality,
        })
    }
}

impl SqlFragment {
    /// Decodes the rows returned by the database into the result of the request.
    pub fn decode(&self, rows: Vec<Vec<Value>>) -> Result<Value> {
        let values = rows
            .into_iter()
            .map(|row| self.layout.decode_row(row))
            .collect::<Result<_>>()?;
        self.cardinality.assemble(values)
    }
}

impl fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl Fragment for SqlFragment {
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
