use super::{Db, Options};
use crate::Result;

use indexmap::IndexMap;
use sieve_core::{driver::Source, schema::Schema};
use sieve_sql::Flavor;

use std::sync::Arc;

pub struct Builder {
    sources: Vec<Arc<dyn Source>>,
    options: Options,
    flavor: Flavor,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            sources: vec![],
            options: Options {
                pushdown: true,
                point_lookups: true,
            },
            flavor: Flavor::default(),
        }
    }
}

impl Builder {
    /// Registers a source under its collection's name.
    pub fn source(&mut self, source: impl Source) -> &mut Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn shared_source(&mut self, source: Arc<dyn Source>) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Run requests, or the parts of them they can, on the sources' backends. On by default.
    pub fn pushdown(&mut self, enabled: bool) -> &mut Self {
        self.options.pushdown = enabled;
        self
    }

    /// Replace scans filtered on a source's identity by lookups. On by default.
    pub fn point_lookups(&mut self, enabled: bool) -> &mut Self {
        self.options.point_lookups = enabled;
        self
    }

    /// The SQL dialect used by [`Db::to_sql`].
    pub fn flavor(&mut self, flavor: Flavor) -> &mut Self {
        self.flavor = flavor;
        self
    }

    pub fn build(&mut self) -> Result<Db> {
        let schema = self
            .sources
            .iter()
            .fold(Schema::builder(), |builder, source| {
                builder.collection(source.collection().clone())
            })
            .build()?;

        let sources: IndexMap<_, _> = self
            .sources
            .iter()
            .map(|source| (source.collection().name.clone(), source.clone()))
            .collect();

        tracing::debug!(
            sources = sources.len(),
            pushdown = self.options.pushdown,
            point_lookups = self.options.point_lookups,
            "built db"
        );

        Ok(Db {
            schema,
            sources,
            options: self.options,
            sql: sieve_sql::Compiler::new(self.flavor),
        })
    }
}
