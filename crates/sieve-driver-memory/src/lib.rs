mod filter;
mod query;

use bson::Document;
use indexmap::IndexMap;
use sieve_core::{
    driver::{Backend, CannotPushDown, Compiler as _, Fragment, Source},
    err,
    schema::{Collection, Schema},
    stmt::{HashKey, NodeId, Request, Value},
    Error, Result,
};
use sieve_document::{
    value::{from_document, to_bson},
    Compiler, DocumentQuery,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard,
};

static STORES: AtomicUsize = AtomicUsize::new(0);

/// An in-memory document store.
///
/// Collections keep documents in insertion order. Elements with an identity are looked up by it
/// without a scan.
#[derive(Debug)]
pub struct Memory {
    store: String,
    compiler: Compiler,
    collections: Mutex<IndexMap<String, Stored>>,
}

/// Counts of the accesses to one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Calls to `Source::all`
    pub scans: usize,

    /// Calls to `Source::lookup`
    pub lookups: usize,

    /// Compiled queries run
    pub queries: usize,
}

#[derive(Debug)]
struct Stored {
    collection: Collection,
    documents: IndexMap<Vec<HashKey>, Document>,

    /// Key of the next element without an identity
    next_seq: i64,

    stats: Stats,
}

/// One collection of a [`Memory`] store, read as a source.
#[derive(Debug)]
pub struct MemoryCollection {
    memory: Arc<Memory>,
    collection: Collection,
}

impl Memory {
    pub fn new() -> Memory {
        let n = STORES.fetch_add(1, Ordering::Relaxed);
        Memory {
            store: format!("memory#{n}"),
            compiler: Compiler::new(),
            collections: Mutex::new(IndexMap::new()),
        }
    }

    /// Adds an empty collection and returns it as a source.
    pub fn create_collection(self: &Arc<Self>, collection: Collection) -> Result<MemoryCollection> {
        let mut collections = self.lock()?;
        if collections.contains_key(&collection.name) {
            return Err(Error::invalid_request(format!(
                "collection `{}` already exists",
                collection.name
            )));
        }
        collections.insert(
            collection.name.clone(),
            Stored {
                collection: collection.clone(),
                documents: IndexMap::new(),
                next_seq: 0,
                stats: Stats::default(),
            },
        );

        Ok(MemoryCollection {
            memory: self.clone(),
            collection,
        })
    }

    pub fn stats(&self, collection: &str) -> Result<Stats> {
        self.with_collection(collection, |stored| Ok(stored.stats))
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&mut Stored) -> Result<T>) -> Result<T> {
        let mut collections = self.lock()?;
        match collections.get_mut(name) {
            Some(stored) => f(stored),
            None => Err(Error::invalid_request(format!("unknown collection `{name}`"))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, IndexMap<String, Stored>>> {
        self.collections
            .lock()
            .map_err(|_| err!("memory store poisoned by a panic"))
    }

    fn run_query(&self, query: &DocumentQuery) -> Result<Value> {
        self.with_collection(&query.collection, |stored| {
            stored.stats.queries += 1;
            tracing::debug!(%query, documents = stored.documents.len(), "running query");
            query::run(query, stored.documents.values())
        })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl Stored {
    /// The key of `item`, from its identity fields.
    fn key(&self, item: &Value) -> Result<Option<Vec<HashKey>>> {
        if self.collection.identity.is_empty() {
            return Ok(None);
        }
        let values = self
            .collection
            .identity
            .iter()
            .map(|name| item.field(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        self.key_of(&values).map(Some)
    }

    fn key_of(&self, values: &[Value]) -> Result<Vec<HashKey>> {
        values
            .iter()
            .map(|value| {
                value.hash_key().ok_or_else(|| {
                    Error::invalid_request(format!(
                        "identity of `{}` must be made of scalars; got {}",
                        self.collection.name,
                        value.kind_name()
                    ))
                })
            })
            .collect()
    }

    /// Builds the stored document for `item`, with the fields in collection order.
    fn document(&self, item: Value) -> Result<Document> {
        let Value::Mapping(mut fields) = item else {
            return Err(Error::invalid_request(format!(
                "elements of `{}` are mappings; got {}",
                self.collection.name,
                item.kind_name()
            )));
        };

        let mut document = Document::new();
        for name in self.collection.fields.keys() {
            let value = fields.shift_remove(name).unwrap_or(Value::Null);
            document.insert(name.clone(), to_bson(&value));
        }
        if let Some(name) = fields.keys().next() {
            return Err(Error::invalid_request(format!(
                "`{}` has no field `{name}`",
                self.collection.name
            )));
        }
        Ok(document)
    }
}

impl MemoryCollection {
    pub fn stats(&self) -> Result<Stats> {
        self.memory.stats(&self.collection.name)
    }

    fn with_stored<T>(&self, f: impl FnOnce(&mut Stored) -> Result<T>) -> Result<T> {
        self.memory.with_collection(&self.collection.name, f)
    }
}

impl Source for MemoryCollection {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn all(&self) -> Result<Vec<Value>> {
        self.with_stored(|stored| {
            stored.stats.scans += 1;
            stored.documents.values().map(from_document).collect()
        })
    }

    fn save(&self, item: Value) -> Result<()> {
        self.with_stored(|stored| {
            let key = match stored.key(&item)? {
                Some(key) => key,
                None => {
                    stored.next_seq += 1;
                    vec![HashKey::I64(stored.next_seq)]
                }
            };
            let document = stored.document(item)?;
            stored.documents.insert(key, document);
            Ok(())
        })
    }

    fn delete(&self, item: &Value) -> Result<()> {
        self.with_stored(|stored| {
            if let Some(key) = stored.key(item)? {
                stored.documents.shift_remove(&key);
                return Ok(());
            }

            let mut position = None;
            for (i, document) in stored.documents.values().enumerate() {
                if from_document(document)?.is_eq(item) {
                    position = Some(i);
                    break;
                }
            }
            if let Some(i) = position {
                stored.documents.shift_remove_index(i);
            }
            Ok(())
        })
    }

    fn supports_lookup(&self) -> bool {
        !self.collection.identity.is_empty()
    }

    fn lookup(&self, identity: &[Value]) -> Result<Option<Value>> {
        self.with_stored(|stored| {
            if identity.len() != stored.collection.identity.len() {
                return Err(Error::invalid_request(format!(
                    "identity of `{}` has {} fields; got {}",
                    stored.collection.name,
                    stored.collection.identity.len(),
                    identity.len()
                )));
            }
            stored.stats.lookups += 1;
            let key = stored.key_of(identity)?;
            stored.documents.get(&key).map(from_document).transpose()
        })
    }

    fn backend(&self) -> Option<Arc<dyn Backend>> {
        Some(self.memory.clone())
    }
}

impl Backend for Memory {
    fn store(&self) -> &str {
        &self.store
    }

    fn supports(&self, request: &Request, id: NodeId) -> bool {
        self.compiler.supports(request, id)
    }

    fn compile(
        &self,
        schema: &Schema,
        request: &Request,
    ) -> core::result::Result<Box<dyn Fragment>, CannotPushDown> {
        Ok(Box::new(self.compiler.compile(schema, request)?))
    }

    fn run(&self, fragment: Box<dyn Fragment>) -> Result<Value> {
        match fragment.into_any().downcast::<DocumentQuery>() {
            Ok(query) => self.run_query(&query),
            Err(_) => Err(err!("fragment was not compiled by a memory store")),
        }
    }
}
