mod interpreter;
pub use interpreter::{SetupInterpreter, VecSource};

mod memory;
pub use memory::SetupMemory;

mod sqlite;
pub use sqlite::SetupSqlite;

use sieve::{driver::Source, schema::Collection, stmt::Value, Result};

use std::sync::Arc;

/// Creates the sources a test runs against.
pub trait Setup: 'static {
    fn name(&self) -> &'static str;

    /// Creates `collection`, stores `items` in it and returns it as a source.
    fn create(&self, collection: Collection, items: Vec<Value>) -> Result<Arc<dyn Source>>;

    /// Returns `true` if requests on the created sources can run on a backend.
    fn has_backend(&self) -> bool;
}
