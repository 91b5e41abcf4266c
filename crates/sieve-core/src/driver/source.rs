use super::Backend;
use crate::{schema::Collection, stmt::Value, Error, Result};

use std::{fmt, sync::Arc};

/// A collection of elements a request can read through `Request::source`.
pub trait Source: fmt::Debug + Send + Sync + 'static {
    fn collection(&self) -> &Collection;

    /// Every element, in storage order.
    fn all(&self) -> Result<Vec<Value>>;

    /// Inserts `item`, replacing the element with the same identity.
    fn save(&self, item: Value) -> Result<()>;

    /// Removes the element with the identity of `item`.
    fn delete(&self, item: &Value) -> Result<()>;

    fn supports_lookup(&self) -> bool {
        false
    }

    /// The element whose identity fields equal `identity`, in the collection's identity order.
    fn lookup(&self, identity: &[Value]) -> Result<Option<Value>> {
        let _ = identity;
        Err(Error::invalid_request(format!(
            "source `{}` does not support lookups",
            self.collection().name
        )))
    }

    /// The backend that can run requests on this source natively, if any.
    fn backend(&self) -> Option<Arc<dyn Backend>> {
        None
    }
}
