mod builder;
pub use builder::Builder;

mod collection;
pub use collection::Collection;

use indexmap::IndexMap;

/// The collections a request may read, by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    collections: IndexMap<String, Collection>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn collections(&self) -> impl ExactSizeIterator<Item = &Collection> {
        self.collections.values()
    }
}
