mod builder;
pub use builder::Builder;

pub use sieve_sql::Flavor;

use crate::engine::{self, Execution};

use indexmap::IndexMap;
use sieve_core::{
    driver::{CannotPushDown, Compiler as _, Source},
    schema::Schema,
    stmt::{Input, Request, Value},
    Error, Result,
};
use sieve_sql::SqlFragment;

use std::sync::Arc;

/// A set of sources requests are executed against.
#[derive(Debug)]
pub struct Db {
    schema: Schema,
    sources: IndexMap<String, Arc<dyn Source>>,
    pub(crate) options: Options,
    sql: sieve_sql::Compiler,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Options {
    pub(crate) pushdown: bool,
    pub(crate) point_lookups: bool,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn source(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(name)
    }

    /// Executes `request`, pushing down to backends what they can run.
    pub fn execute(&self, request: &Request) -> Result<Value> {
        self.execute_explain(request)
            .map(|execution| execution.value)
    }

    /// Executes `request` and reports how it was run.
    pub fn execute_explain(&self, request: &Request) -> Result<Execution> {
        engine::execute(self, request)
    }

    /// Compiles `request` with the configured SQL flavor, without running it.
    pub fn to_sql(&self, request: &Request) -> core::result::Result<SqlFragment, CannotPushDown> {
        self.sql.compile(&self.schema, request)
    }
}

impl Input for Db {
    fn scan(&self, name: &str) -> Result<Vec<Value>> {
        let Some(source) = self.sources.get(name) else {
            return Err(Error::invalid_request(format!("unknown source `{name}`")));
        };
        tracing::trace!(source = name, "scanning source");
        source.all()
    }
}
