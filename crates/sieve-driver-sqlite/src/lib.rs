mod table;
pub use table::SqliteTable;

mod value;
use value::Value;

use rusqlite::Connection;
use sieve_core::{
    driver::{Backend, CannotPushDown, Compiler as _, Fragment},
    err,
    schema::{Collection, Schema},
    stmt::{self, NodeId, Request},
    Error, Result,
};
use sieve_sql::{stmt::CreateTable, Compiler, SqlFragment, Statement};
use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use url::Url;

/// Distinguishes in-memory databases, which all share one URL.
static IN_MEMORY: AtomicUsize = AtomicUsize::new(0);

/// A SQLite database holding one table per collection.
#[derive(Debug)]
pub struct Sqlite {
    url: String,
    store: String,
    connection: Mutex<Connection>,
    compiler: Compiler,
}

impl Sqlite {
    /// Opens a database from a connection URL: `sqlite::memory:` or `sqlite:<path>`.
    pub fn new(url: impl Into<String>) -> Result<Sqlite> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver)?;

        if url.scheme() != "sqlite" {
            return Err(err!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            ));
        }

        if url.path() == ":memory:" {
            Sqlite::in_memory()
        } else {
            Sqlite::open(url.path())
        }
    }

    /// Creates an in-memory database
    pub fn in_memory() -> Result<Sqlite> {
        let connection = Connection::open_in_memory().map_err(Error::driver)?;
        let n = IN_MEMORY.fetch_add(1, Ordering::Relaxed);
        Ok(Sqlite::from_connection(
            "sqlite::memory:".to_string(),
            format!("sqlite::memory:#{n}"),
            connection,
        ))
    }

    /// Opens the database file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Sqlite> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(Error::driver)?;
        let url = format!("sqlite:{}", path.display());
        Ok(Sqlite::from_connection(url.clone(), url, connection))
    }

    fn from_connection(url: String, store: String, connection: Connection) -> Sqlite {
        Sqlite {
            url,
            store,
            connection: Mutex::new(connection),
            compiler: Compiler::sqlite(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creates the table storing `collection` and returns it as a source.
    pub fn create_table(self: &Arc<Self>, collection: Collection) -> Result<SqliteTable> {
        let create_table = CreateTable::for_collection(&collection)?;
        self.execute(&create_table.into())?;
        SqliteTable::new(self.clone(), collection)
    }

    pub(crate) fn execute(&self, statement: &Statement) -> Result<usize> {
        let mut params = vec![];
        let sql = self.compiler.serializer().serialize(statement, &mut params);
        tracing::debug!(%sql, params = params.len(), "executing statement");

        let connection = self.connection()?;
        connection
            .execute(&sql, rusqlite::params_from_iter(params.iter().map(Value)))
            .map_err(Error::driver)
    }

    /// Runs a query and decodes its rows.
    pub(crate) fn run_sql(&self, fragment: &SqlFragment) -> Result<stmt::Value> {
        let width = fragment.layout.width();
        let connection = self.connection()?;
        let mut statement = connection
            .prepare_cached(&fragment.sql)
            .map_err(Error::driver)?;
        let mut rows = statement
            .query(rusqlite::params_from_iter(fragment.params.iter().map(Value)))
            .map_err(Error::driver)?;

        let mut ret = vec![];
        while let Some(row) = rows.next().map_err(Error::driver)? {
            let mut items = Vec::with_capacity(width);
            for index in 0..width {
                items.push(value::from_sql(row, index)?);
            }
            ret.push(items);
        }
        tracing::trace!(sql = %fragment.sql, rows = ret.len(), "query returned");

        fragment.decode(ret)
    }

    pub(crate) fn compile_sql(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<SqlFragment, CannotPushDown> {
        self.compiler.compile(schema, request)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| err!("SQLite connection poisoned by a panic"))
    }
}

impl Backend for Sqlite {
    fn store(&self) -> &str {
        &self.store
    }

    fn supports(&self, request: &Request, id: NodeId) -> bool {
        self.compiler.supports(request, id)
    }

    fn compile(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<Box<dyn Fragment>, CannotPushDown> {
        Ok(Box::new(self.compile_sql(schema, request)?))
    }

    fn run(&self, fragment: Box<dyn Fragment>) -> Result<stmt::Value> {
        match fragment.into_any().downcast::<SqlFragment>() {
            Ok(fragment) => self.run_sql(&fragment),
            Err(_) => Err(err!("fragment was not compiled by a SQLite backend")),
        }
    }
}
