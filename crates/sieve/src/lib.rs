pub mod db;
pub use db::Db;

mod engine;
pub use engine::{Execution, Strategy};

pub use sieve_core::{driver, schema, stmt, Error, Result};
