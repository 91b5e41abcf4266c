use super::Setup;

use sieve::{driver::Source, schema::Collection, stmt::Value, Result};
use sieve_driver_memory::Memory;

use std::sync::Arc;

/// Collections of one in-memory document store.
#[derive(Debug)]
pub struct SetupMemory {
    pub memory: Arc<Memory>,
}

impl SetupMemory {
    pub fn new() -> SetupMemory {
        SetupMemory {
            memory: Arc::new(Memory::new()),
        }
    }
}

impl Default for SetupMemory {
    fn default() -> Self {
        SetupMemory::new()
    }
}

impl Setup for SetupMemory {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create(&self, collection: Collection, items: Vec<Value>) -> Result<Arc<dyn Source>> {
        let source = self.memory.create_collection(collection)?;
        for item in items {
            source.save(item)?;
        }
        Ok(Arc::new(source))
    }

    fn has_backend(&self) -> bool {
        true
    }
}
