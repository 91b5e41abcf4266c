use crate::stmt::{Type, TypeMapping};

use indexmap::IndexMap;

/// Type descriptor of a source: its fields and the fields identifying an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub fields: IndexMap<String, Type>,

    /// Fields that together identify one element. Empty when elements have no identity.
    pub identity: Vec<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Collection {
        Collection {
            name: name.into(),
            fields: IndexMap::new(),
            identity: vec![],
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Collection {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn identity<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Collection {
        self.identity = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The type of one element.
    pub fn item_ty(&self) -> Type {
        Type::Mapping(TypeMapping {
            fields: self.fields.clone(),
            source: Some(self.name.clone()),
        })
    }

    /// The type of the source as a whole.
    pub fn ty(&self) -> Type {
        Type::list(self.item_ty())
    }
}
