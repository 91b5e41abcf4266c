mod compile;
pub use compile::{Capability, Compiler, SqlFragment};

mod layout;
pub use layout::{Cardinality, Layout};

pub mod serializer;
pub use serializer::{Flavor, Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;
