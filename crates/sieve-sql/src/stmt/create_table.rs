use super::{ColumnDef, ColumnType};

use sieve_core::{schema::Collection, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Name of the table
    pub name: String,

    /// Column definitions
    pub columns: Vec<ColumnDef>,

    /// Primary key columns
    pub primary_key: Vec<String>,
}

impl CreateTable {
    /// The table storing the elements of `collection`, keyed on its identity.
    pub fn for_collection(collection: &Collection) -> Result<CreateTable> {
        let columns = collection
            .fields
            .iter()
            .map(|(name, ty)| {
                Ok(ColumnDef {
                    name: name.clone(),
                    ty: ColumnType::from_ty(ty)?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(CreateTable {
            name: collection.name.clone(),
            columns,
            primary_key: collection.identity.clone(),
        })
    }
}
