use sieve::{
    driver::{Backend, Source},
    schema::Collection,
    stmt::Value,
    Error, Result,
};

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// Calls made through a [`CountingSource`].
#[derive(Debug, Default)]
pub struct Calls {
    pub all: AtomicUsize,
    pub lookup: AtomicUsize,

    /// When set, `all` fails
    pub forbid_scans: AtomicBool,
}

impl Calls {
    pub fn all(&self) -> usize {
        self.all.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookup.load(Ordering::SeqCst)
    }

    pub fn forbid_scans(&self) {
        self.forbid_scans.store(true, Ordering::SeqCst);
    }
}

/// Wraps a source, counting scans and lookups.
#[derive(Debug)]
pub struct CountingSource {
    inner: Arc<dyn Source>,
    calls: Arc<Calls>,
}

impl CountingSource {
    pub fn new(inner: Arc<dyn Source>) -> CountingSource {
        CountingSource {
            inner,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<Calls> {
        self.calls.clone()
    }
}

impl Source for CountingSource {
    fn collection(&self) -> &Collection {
        self.inner.collection()
    }

    fn all(&self) -> Result<Vec<Value>> {
        self.calls.all.fetch_add(1, Ordering::SeqCst);
        if self.calls.forbid_scans.load(Ordering::SeqCst) {
            return Err(Error::invalid_request(format!(
                "`{}` must not be scanned",
                self.collection().name
            )));
        }
        self.inner.all()
    }

    fn save(&self, item: Value) -> Result<()> {
        self.inner.save(item)
    }

    fn delete(&self, item: &Value) -> Result<()> {
        self.inner.delete(item)
    }

    fn supports_lookup(&self) -> bool {
        self.inner.supports_lookup()
    }

    fn lookup(&self, identity: &[Value]) -> Result<Option<Value>> {
        self.calls.lookup.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(identity)
    }

    fn backend(&self) -> Option<Arc<dyn Backend>> {
        self.inner.backend()
    }
}
