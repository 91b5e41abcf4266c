use super::{Expr, TableAlias};

/// `SELECT` statement, usable as a query, a derived table or a sub-select.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,

    /// `None` for a select evaluating expressions only
    pub from: Option<TableRef>,

    /// Conjuncts of the `WHERE` clause
    pub filter: Vec<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expr,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub factor: TableFactor,
    pub alias: TableAlias,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    /// A table, by name
    Table(String),

    /// A sub-select
    Derived(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub descending: bool,
}

impl Select {
    pub fn from_table(name: impl Into<String>, alias: TableAlias) -> Select {
        Select {
            from: Some(TableRef {
                factor: TableFactor::Table(name.into()),
                alias,
            }),
            ..Select::default()
        }
    }

    pub fn from_derived(select: Select, alias: TableAlias) -> Select {
        Select {
            from: Some(TableRef {
                factor: TableFactor::Derived(Box::new(select)),
                alias,
            }),
            ..Select::default()
        }
    }

    /// Returns `true` while `LIMIT`/`OFFSET` are unset.
    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    /// Narrows the rows to `[start:stop]` of the rows the select produces now.
    ///
    /// Bounds are non-negative.
    pub fn slice(&mut self, start: Option<i64>, stop: Option<i64>) {
        let start = start.unwrap_or(0);
        let remaining = self.limit.map(|limit| limit.saturating_sub(start).max(0));
        let wanted = stop.map(|stop| stop.saturating_sub(start).max(0));

        let offset = self.offset.unwrap_or(0).saturating_add(start);
        self.offset = (offset > 0).then_some(offset);
        self.limit = match (remaining, wanted) {
            (Some(remaining), Some(wanted)) => Some(remaining.min(wanted)),
            (limit, None) | (None, limit) => limit,
        };
    }
}
