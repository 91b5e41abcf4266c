#[macro_use]
mod error;
pub use error::Error;

pub mod dispatch;

pub mod driver;
pub use driver::{Backend, Source};

pub mod rewrite;

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Sieve's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
