use super::{Collection, Schema};
use crate::{Error, Result};

use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct Builder {
    collections: Vec<Collection>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut collections = IndexMap::new();

        for collection in self.collections {
            verify(&collection)?;

            let name = collection.name.clone();
            if collections.insert(name.clone(), collection).is_some() {
                return Err(Error::invalid_request(format!(
                    "collection `{name}` is defined twice"
                )));
            }
        }

        Ok(Schema { collections })
    }
}

fn verify(collection: &Collection) -> Result<()> {
    for field in &collection.identity {
        if !collection.fields.contains_key(field) {
            return Err(Error::invalid_request(format!(
                "identity field `{field}` is not a field of `{}`",
                collection.name
            )));
        }
    }
    Ok(())
}
