use sieve_core::{stmt::Type, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// The column type storing values of field type `ty`. Only scalar fields have one.
    pub fn from_ty(ty: &Type) -> Result<ColumnType> {
        match ty {
            Type::Bool => Ok(ColumnType::Boolean),
            Type::I64 => Ok(ColumnType::Integer),
            Type::F64 => Ok(ColumnType::Real),
            Type::String => Ok(ColumnType::Text),
            _ => Err(Error::invalid_request(format!(
                "fields of type {ty:?} cannot be stored in a column"
            ))),
        }
    }
}
