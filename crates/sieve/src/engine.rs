mod lookup;
mod pushdown;

use crate::{Db, Result};

use sieve_core::{
    driver::Backend,
    stmt::{Request, Value},
};

use std::sync::Arc;

/// How a request was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The whole request ran on one backend.
    Pushed,

    /// A prefix of the request's chain ran on a backend and the interpreter ran the rest.
    PartialCut,

    /// An identity filter was answered by a lookup instead of a scan.
    PointLookup,

    /// The interpreter ran the request, scanning sources.
    FullFallback,
}

/// The result of a request along with how it was obtained.
#[derive(Debug)]
pub struct Execution {
    pub strategy: Strategy,
    pub value: Value,

    /// The native query sent to the backend, if any
    pub fragment: Option<String>,
}

pub(crate) fn execute(db: &Db, request: &Request) -> Result<Execution> {
    // Invalid requests fail before any source is touched.
    let ty = request.infer_ty(db.schema(), &[])?;
    tracing::debug!(%request, ?ty, "executing request");

    if db.options.point_lookups {
        if let Some(execution) = lookup::try_lookup(db, request)? {
            return Ok(execution);
        }
    }

    if db.options.pushdown {
        if let Some(backend) = backend_of(db, request) {
            if let Some(execution) = pushdown::try_pushdown(db, &*backend, request)? {
                return Ok(execution);
            }
        }
    }

    tracing::debug!(%request, "interpreting request");
    let value = request.eval(db)?;
    Ok(Execution {
        strategy: Strategy::FullFallback,
        value,
        fragment: None,
    })
}

/// The backend every source of `request` lives in, if there is exactly one.
fn backend_of(db: &Db, request: &Request) -> Option<Arc<dyn Backend>> {
    let mut found: Option<Arc<dyn Backend>> = None;

    for name in request.sources() {
        let Some(backend) = db.source(name).and_then(|source| source.backend()) else {
            tracing::debug!(source = name, "source has no backend");
            return None;
        };

        match &found {
            Some(other) if other.store() != backend.store() => {
                tracing::debug!(
                    first = other.store(),
                    second = backend.store(),
                    "request reads several stores"
                );
                return None;
            }
            Some(_) => {}
            None => found = Some(backend),
        }
    }

    found
}
