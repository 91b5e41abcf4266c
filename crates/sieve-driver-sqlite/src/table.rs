use crate::Sqlite;

use sieve_core::{
    driver::{Backend, Source},
    err,
    schema::{Collection, Schema},
    stmt::{Request, Value},
    Error, Result,
};
use sieve_sql::stmt::{BinaryOp, Delete, Expr, ExprColumn, Insert};

use std::sync::Arc;

/// A table of a [`Sqlite`] database, read as the source of its collection.
#[derive(Debug)]
pub struct SqliteTable {
    sqlite: Arc<Sqlite>,
    collection: Collection,

    /// Schema with this collection only, for compiling scans.
    schema: Schema,
}

impl SqliteTable {
    pub(crate) fn new(sqlite: Arc<Sqlite>, collection: Collection) -> Result<SqliteTable> {
        let schema = Schema::builder().collection(collection.clone()).build()?;
        Ok(SqliteTable {
            sqlite,
            collection,
            schema,
        })
    }

    /// The columns identifying a row: the identity, or every column without one.
    fn key(&self) -> Vec<&String> {
        if self.collection.identity.is_empty() {
            self.collection.fields.keys().collect()
        } else {
            self.collection.identity.iter().collect()
        }
    }
}

impl Source for SqliteTable {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn all(&self) -> Result<Vec<Value>> {
        let request = Request::source(&self.collection.name);
        let fragment = self
            .sqlite
            .compile_sql(&self.schema, &request)
            .map_err(|reason| err!("cannot scan `{}`: {reason}", self.collection.name))?;
        self.sqlite.run_sql(&fragment)?.into_list()
    }

    fn save(&self, item: Value) -> Result<()> {
        let Value::Mapping(mut fields) = item else {
            return Err(Error::invalid_request(format!(
                "elements of `{}` are mappings; got {}",
                self.collection.name,
                item.kind_name()
            )));
        };

        let columns: Vec<String> = self.collection.fields.keys().cloned().collect();
        let values = columns
            .iter()
            .map(|name| fields.shift_remove(name).unwrap_or(Value::Null))
            .collect();
        if let Some(name) = fields.keys().next() {
            return Err(Error::invalid_request(format!(
                "`{}` has no field `{name}`",
                self.collection.name
            )));
        }

        let insert = Insert {
            table: self.collection.name.clone(),
            columns,
            values,
            replace_on: self.collection.identity.clone(),
        };
        self.sqlite.execute(&insert.into())?;
        Ok(())
    }

    fn delete(&self, item: &Value) -> Result<()> {
        let filter = self
            .key()
            .into_iter()
            .map(|name| {
                let column = Expr::Column(ExprColumn {
                    table: None,
                    name: name.clone(),
                });
                Ok(Expr::binary_op(
                    column,
                    BinaryOp::Eq,
                    Expr::Value(item.field(name)?.clone()),
                ))
            })
            .collect::<Result<_>>()?;

        let delete = Delete {
            table: self.collection.name.clone(),
            filter,
        };
        let deleted = self.sqlite.execute(&delete.into())?;
        tracing::debug!(collection = %self.collection.name, deleted, "deleted rows");
        Ok(())
    }

    fn backend(&self) -> Option<Arc<dyn Backend>> {
        Some(self.sqlite.clone())
    }
}
