use super::Setup;

use sieve::{driver::Source, schema::Collection, stmt::Value, Result};
use sieve_driver_sqlite::Sqlite;

use std::sync::Arc;

/// Tables of one in-memory SQLite database.
#[derive(Debug)]
pub struct SetupSqlite {
    pub sqlite: Arc<Sqlite>,
}

impl SetupSqlite {
    pub fn new() -> SetupSqlite {
        SetupSqlite {
            sqlite: Arc::new(Sqlite::in_memory().unwrap()),
        }
    }
}

impl Default for SetupSqlite {
    fn default() -> Self {
        SetupSqlite::new()
    }
}

impl Setup for SetupSqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn create(&self, collection: Collection, items: Vec<Value>) -> Result<Arc<dyn Source>> {
        let table = self.sqlite.create_table(collection)?;
        for item in items {
            table.save(item)?;
        }
        Ok(Arc::new(table))
    }

    fn has_backend(&self) -> bool {
        true
    }
}
