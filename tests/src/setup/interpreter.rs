use super::Setup;

use sieve::{driver::Source, schema::Collection, stmt::Value, Error, Result};

use std::sync::{Arc, Mutex};

/// Sources without a backend: every request is interpreted.
#[derive(Debug, Default)]
pub struct SetupInterpreter {}

impl SetupInterpreter {
    pub fn new() -> SetupInterpreter {
        SetupInterpreter {}
    }
}

impl Setup for SetupInterpreter {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn create(&self, collection: Collection, items: Vec<Value>) -> Result<Arc<dyn Source>> {
        let source = VecSource::new(collection);
        for item in items {
            source.save(item)?;
        }
        Ok(Arc::new(source))
    }

    fn has_backend(&self) -> bool {
        false
    }
}

/// A list of elements, looked up by a linear search on the identity.
#[derive(Debug)]
pub struct VecSource {
    collection: Collection,
    items: Mutex<Vec<Value>>,
}

impl VecSource {
    pub fn new(collection: Collection) -> VecSource {
        VecSource {
            collection,
            items: Mutex::new(vec![]),
        }
    }

    fn position(items: &[Value], identity: &[String], item: &Value) -> Result<Option<usize>> {
        let key = identity
            .iter()
            .map(|field| item.field(field))
            .collect::<Result<Vec<_>>>()?;
        Ok(VecSource::position_of(items, identity, &key))
    }

    fn position_of(items: &[Value], identity: &[String], key: &[&Value]) -> Option<usize> {
        items.iter().position(|candidate| {
            identity
                .iter()
                .zip(key)
                .all(|(field, value)| matches!(candidate.field(field), Ok(v) if v.is_eq(value)))
        })
    }
}

impl Source for VecSource {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn all(&self) -> Result<Vec<Value>> {
        Ok(self.items.lock().unwrap().clone())
    }

    fn save(&self, item: Value) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if self.collection.identity.is_empty() {
            items.push(item);
            return Ok(());
        }

        match VecSource::position(&items, &self.collection.identity, &item)? {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
        Ok(())
    }

    fn delete(&self, item: &Value) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        let index = if self.collection.identity.is_empty() {
            items.iter().position(|candidate| candidate.is_eq(item))
        } else {
            VecSource::position(&items, &self.collection.identity, item)?
        };
        match index {
            Some(index) => {
                items.remove(index);
                Ok(())
            }
            None => Err(Error::invalid_request("no such element")),
        }
    }

    fn supports_lookup(&self) -> bool {
        !self.collection.identity.is_empty()
    }

    fn lookup(&self, identity: &[Value]) -> Result<Option<Value>> {
        let items = self.items.lock().unwrap();
        let key: Vec<_> = identity.iter().collect();
        Ok(VecSource::position_of(&items, &self.collection.identity, &key)
            .map(|index| items[index].clone()))
    }
}
