use bson::{Bson, Document};
use sieve_core::{bail, stmt::Value, Result};

pub fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(v) => Bson::Boolean(*v),
        Value::I64(v) => Bson::Int64(*v),
        Value::F64(v) => Bson::Double(*v),
        Value::String(v) => Bson::String(v.clone()),
        Value::List(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Mapping(fields) => Bson::Document(to_document(fields.iter())),
    }
}

/// Converts the fields of a mapping into a document, keeping their order.
pub fn to_document<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) -> Document {
    fields
        .map(|(name, value)| (name.clone(), to_bson(value)))
        .collect()
}

pub fn from_bson(bson: &Bson) -> Result<Value> {
    Ok(match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(v) => Value::Bool(*v),
        Bson::Int32(v) => Value::I64(i64::from(*v)),
        Bson::Int64(v) => Value::I64(*v),
        Bson::Double(v) => Value::F64(*v),
        Bson::String(v) => Value::String(v.clone()),
        Bson::Array(items) => Value::List(items.iter().map(from_bson).collect::<Result<_>>()?),
        Bson::Document(doc) => from_document(doc)?,
        other => bail!("unsupported BSON value {other}"),
    })
}

pub fn from_document(doc: &Document) -> Result<Value> {
    let fields = doc
        .iter()
        .map(|(name, value)| Ok((name.clone(), from_bson(value)?)))
        .collect::<Result<_>>()?;
    Ok(Value::Mapping(fields))
}
