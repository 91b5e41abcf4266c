use super::CannotPushDown;
use crate::{
    schema::Schema,
    stmt::{NodeId, Request, Value},
    Result,
};

use std::{any::Any, fmt};

/// A backend-native query produced by [`Backend::compile`].
///
/// `Display` renders the native query text, for diagnostics.
pub trait Fragment: fmt::Debug + fmt::Display + Send + 'static {
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A store that runs requests natively.
pub trait Backend: fmt::Debug + Send + Sync + 'static {
    /// Identifies the store. Requests reading several sources are only pushed down when every
    /// source reports the same store.
    fn store(&self) -> &str;

    /// Returns `true` if the subtree at `id` only uses operations the backend understands.
    ///
    /// This is a cheap check ahead of [`Backend::compile`], which may still refuse the request.
    fn supports(&self, request: &Request, id: NodeId) -> bool;

    /// Compiles the whole request.
    fn compile(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<Box<dyn Fragment>, CannotPushDown>;

    /// Runs a fragment returned by this backend's [`Backend::compile`].
    fn run(&self, fragment: Box<dyn Fragment>) -> Result<Value>;
}

/// Translation of requests into one query language.
///
/// Backends delegate to a compiler and add the I/O.
pub trait Compiler {
    type Fragment;

    fn supports(&self, request: &Request, id: NodeId) -> bool;

    fn compile(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<Self::Fragment, CannotPushDown>;
}
