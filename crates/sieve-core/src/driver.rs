mod backend;
pub use backend::{Backend, Compiler, Fragment};

mod cannot_push_down;
pub use cannot_push_down::CannotPushDown;

mod source;
pub use source::Source;
