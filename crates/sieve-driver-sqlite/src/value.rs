use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use sieve_core::{err, stmt, Error, Result};

/// A parameter bound to a statement.
#[derive(Debug)]
pub(crate) struct Value<'a>(pub(crate) &'a stmt::Value);

/// Reads the column at `index` of `row`. Typing is left to the fragment's layout.
pub(crate) fn from_sql(row: &Row<'_>, index: usize) -> Result<stmt::Value> {
    let value: SqlValue = row.get(index).map_err(Error::driver)?;

    Ok(match value {
        SqlValue::Null => stmt::Value::Null,
        SqlValue::Integer(value) => stmt::Value::I64(value),
        SqlValue::Real(value) => stmt::Value::F64(value),
        SqlValue::Text(value) => stmt::Value::String(value),
        SqlValue::Blob(_) => return Err(err!("unexpected BLOB in column {index}")),
    })
}

impl ToSql for Value<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            stmt::Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            stmt::Value::Bool(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(i64::from(*v)))),
            stmt::Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            stmt::Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            stmt::Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            value @ (stmt::Value::List(_) | stmt::Value::Mapping(_)) => {
                Err(rusqlite::Error::ToSqlConversionFailure(Box::new(err!(
                    "{} values cannot be stored in a column",
                    value.kind_name()
                ))))
            }
        }
    }
}
