use crate::{
    stmt::{Expr, SelectColumn, TableAlias},
    Layout,
};

use sieve_core::stmt::{Type, TypeMapping, Value};

use indexmap::IndexMap;

/// How a value is read from the columns of a row.
#[derive(Debug, Clone)]
pub(super) enum Shape {
    /// A single column
    Scalar(Expr, Type),

    /// A mapping spread over the columns of its fields
    Mapping(IndexMap<String, Shape>),

    /// A stored field SQL cannot read, such as a nested list
    Opaque(Type),
}

impl Shape {
    pub(super) fn ty(&self) -> Type {
        match self {
            Shape::Scalar(_, ty) | Shape::Opaque(ty) => ty.clone(),
            Shape::Mapping(fields) => Type::Mapping(TypeMapping {
                fields: fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.ty()))
                    .collect(),
                source: None,
            }),
        }
    }

    /// Appends the expression of every column, in layout order.
    pub(super) fn columns(&self, out: &mut Vec<Expr>) -> Result<(), String> {
        match self {
            Shape::Scalar(expr, _) => out.push(expr.clone()),
            Shape::Mapping(fields) => {
                for field in fields.values() {
                    field.columns(out)?;
                }
            }
            Shape::Opaque(ty) => return Err(format!("values of type {ty:?} cannot be selected")),
        }
        Ok(())
    }

    /// The select list producing the shape, one `c{n}` column per scalar.
    ///
    /// A shape without columns still selects a placeholder, as SQL requires one column.
    pub(super) fn select_columns(&self) -> Result<Vec<SelectColumn>, String> {
        let mut exprs = vec![];
        self.columns(&mut exprs)?;
        if exprs.is_empty() {
            exprs.push(Expr::Value(Value::Null));
        }
        Ok(exprs
            .into_iter()
            .enumerate()
            .map(|(i, expr)| SelectColumn {
                expr,
                alias: format!("c{i}"),
            })
            .collect())
    }

    pub(super) fn layout(&self) -> Result<Layout, String> {
        match self {
            Shape::Scalar(_, ty) => Ok(Layout::Column(ty.clone())),
            Shape::Mapping(fields) => fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), field.layout()?)))
                .collect::<Result<_, String>>()
                .map(Layout::Mapping),
            Shape::Opaque(ty) => Err(format!("values of type {ty:?} cannot be selected")),
        }
    }

    /// The same shape, read from the `c{n}` columns of the derived table `alias` produced by
    /// [`Shape::select_columns`].
    pub(super) fn rebase(&self, alias: TableAlias) -> Shape {
        self.rebase_from(alias, &mut 0)
    }

    fn rebase_from(&self, alias: TableAlias, next: &mut usize) -> Shape {
        match self {
            Shape::Scalar(_, ty) => {
                let column = Expr::column(alias, format!("c{next}"));
                *next += 1;
                Shape::Scalar(column, ty.clone())
            }
            Shape::Mapping(fields) => Shape::Mapping(
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.rebase_from(alias, next)))
                    .collect(),
            ),
            Shape::Opaque(ty) => Shape::Opaque(ty.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Shape {
        let alias = TableAlias(0);
        Shape::Mapping(IndexMap::from([
            (
                "id".to_string(),
                Shape::Scalar(Expr::column(alias, "id"), Type::I64),
            ),
            (
                "name".to_string(),
                Shape::Scalar(Expr::column(alias, "name"), Type::String),
            ),
        ]))
    }

    #[test]
    fn rebase_follows_column_order() {
        let rebased = row().rebase(TableAlias(3));
        let mut columns = vec![];
        rebased.columns(&mut columns).unwrap();
        assert_eq!(
            columns,
            vec![
                Expr::column(TableAlias(3), "c0"),
                Expr::column(TableAlias(3), "c1")
            ]
        );
    }

    #[test]
    fn opaque_fields_cannot_be_selected() {
        let shape = Shape::Mapping(IndexMap::from([(
            "tags".to_string(),
            Shape::Opaque(Type::list(Type::String)),
        )]));
        assert!(shape.select_columns().is_err());
        assert!(shape.layout().is_err());
    }

    #[test]
    fn empty_mapping_selects_a_placeholder() {
        let columns = Shape::Mapping(IndexMap::new()).select_columns().unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].alias, "c0");
    }
}
