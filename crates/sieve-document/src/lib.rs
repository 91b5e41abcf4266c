mod compile;
pub use compile::Compiler;

pub mod merge;

mod query;
pub use query::{DocumentQuery, Projection, Single};

pub mod value;
