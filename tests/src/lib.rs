#[macro_use]
mod macros;

mod counting;
pub use counting::{Calls, CountingSource};

mod db_test;
pub use db_test::DbTest;

pub mod fixture;

pub mod setup;
pub use setup::{Setup, SetupInterpreter, SetupMemory, SetupSqlite};
