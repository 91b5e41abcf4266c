use sieve_core::{
    stmt::{Type, Value},
    Error, Result,
};

use indexmap::IndexMap;

/// How the columns of one result row decode into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    /// One column holding a value of the given type
    Column(Type),

    /// Consecutive columns holding the fields of a mapping, in order
    Mapping(IndexMap<String, Layout>),
}

/// How the decoded rows combine into the result of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Cardinality {
    /// Each row is an element of the resulting list
    List,

    /// Exactly one row, holding a scalar or mapping result
    Value,

    /// The single element of the rows. `default` stands in for no row at all.
    One {
        default: Option<Value>,

        /// Describes the request in cardinality errors
        context: String,
    },
}

impl Layout {
    /// Number of columns the layout reads.
    pub fn width(&self) -> usize {
        match self {
            Layout::Column(_) => 1,
            Layout::Mapping(fields) => fields.values().map(Layout::width).sum(),
        }
    }

    pub fn decode_row(&self, row: Vec<Value>) -> Result<Value> {
        let width = row.len();
        let mut columns = row.into_iter();
        let value = self.decode(&mut columns)?;
        if self.width() > width {
            return Err(Error::invalid_request(format!(
                "row has {width} columns, expected {}",
                self.width()
            )));
        }
        Ok(value)
    }

    fn decode(&self, columns: &mut impl Iterator<Item = Value>) -> Result<Value> {
        match self {
            Layout::Column(ty) => decode_column(ty, columns.next().unwrap_or_default()),
            Layout::Mapping(fields) => fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), field.decode(columns)?)))
                .collect::<Result<_>>()
                .map(Value::Mapping),
        }
    }
}

/// Converts a column value to the representation of `ty`.
///
/// Booleans come back from sqlite as integers, and integral reals may come back as integers.
/// Integer arithmetic that overflows comes back as a real.
fn decode_column(ty: &Type, value: Value) -> Result<Value> {
    Ok(match (ty, value) {
        (Type::Bool, Value::I64(v)) => Value::Bool(v != 0),
        (Type::F64, Value::I64(v)) => Value::F64(v as f64),
        (Type::I64, Value::F64(_)) => {
            return Err(Error::expression_evaluation_failed("integer overflow"))
        }
        (Type::List(item), Value::List(items)) => Value::List(
            items
                .into_iter()
                .map(|value| decode_column(item, value))
                .collect::<Result<_>>()?,
        ),
        (_, value) => value,
    })
}

impl Cardinality {
    /// Combines the decoded rows.
    pub fn assemble(&self, mut values: Vec<Value>) -> Result<Value> {
        match self {
            Cardinality::List => Ok(Value::List(values)),
            Cardinality::Value => values
                .pop()
                .ok_or_else(|| Error::invalid_request("query returned no row")),
            Cardinality::One { default, context } => match values.len() {
                0 => default
                    .clone()
                    .ok_or_else(|| Error::empty_result(context.clone())),
                1 => Ok(values.remove(0)),
                _ => Err(Error::multiple_results(context.clone())),
            },
        }
    }
}
