use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            stmt::Statement::CreateTable(stmt) => stmt.to_sql(f),
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Query(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);
        let columns = Comma(&self.columns);
        let primary_key = if self.primary_key.is_empty() {
            None
        } else {
            Some((", PRIMARY KEY ", Columns(&self.primary_key)))
        };

        fmt!(f, "CREATE TABLE " name " (" columns primary_key ")");
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = Ident(&self.table);
        let filter = Where(&self.filter);

        fmt!(f, "DELETE FROM " table filter);
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = Ident(&self.table);
        let columns = Columns(&self.columns);
        let values = Comma(&self.values);

        if f.serializer.is_sqlite() && !self.replace_on.is_empty() {
            fmt!(f, "INSERT OR REPLACE INTO " table " " columns " VALUES (" values ")");
            return;
        }

        fmt!(f, "INSERT INTO " table " " columns " VALUES (" values ")");

        if !self.replace_on.is_empty() {
            let target = Columns(&self.replace_on);
            let updates: Vec<_> = self
                .columns
                .iter()
                .filter(|column| !self.replace_on.contains(column))
                .map(Excluded)
                .collect();

            if updates.is_empty() {
                fmt!(f, " ON CONFLICT " target " DO NOTHING");
            } else {
                let updates = Comma(updates);
                fmt!(f, " ON CONFLICT " target " DO UPDATE SET " updates);
            }
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let distinct = self.distinct.then_some("DISTINCT ");
        let columns = Comma(&self.columns);
        let from = self.from.as_ref().map(|from| (" FROM ", from));
        let filter = Where(&self.filter);
        let group_by =
            (!self.group_by.is_empty()).then(|| (" GROUP BY ", Comma(&self.group_by)));
        let order_by =
            (!self.order_by.is_empty()).then(|| (" ORDER BY ", Comma(&self.order_by)));

        fmt!(f, "SELECT " distinct columns from filter group_by order_by);

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => fmt!(f, " LIMIT " limit " OFFSET " offset),
            (Some(limit), None) => fmt!(f, " LIMIT " limit),
            // sqlite requires a LIMIT clause before OFFSET.
            (None, Some(offset)) if f.serializer.is_sqlite() => {
                fmt!(f, " LIMIT -1 OFFSET " offset)
            }
            (None, Some(offset)) => fmt!(f, " OFFSET " offset),
            (None, None) => {}
        }
    }
}

impl ToSql for &stmt::SelectColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let expr = &self.expr;
        let alias = &self.alias;
        fmt!(f, expr " AS " alias);
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match &self.factor {
            stmt::TableFactor::Table(name) => {
                let name = Ident(name);
                fmt!(f, name " AS " self.alias);
            }
            stmt::TableFactor::Derived(select) => {
                let select = &**select;
                fmt!(f, "(" select ") AS " self.alias);
            }
        }
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        // Nulls sort lowest on every flavor.
        let direction = match (self.descending, f.serializer.is_sqlite()) {
            (false, true) => " ASC",
            (true, true) => " DESC",
            (false, false) => " ASC NULLS FIRST",
            (true, false) => " DESC NULLS LAST",
        };
        let expr = &self.expr;
        fmt!(f, expr direction);
    }
}

/// ` WHERE a AND b`, or nothing without conjuncts.
struct Where<'a>(&'a [stmt::Expr]);

impl ToSql for Where<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if !self.0.is_empty() {
            let filter = Delimited(self.0, " AND ");
            fmt!(f, " WHERE " filter);
        }
    }
}

/// `("a", "b")`
struct Columns<'a>(&'a [String]);

impl ToSql for Columns<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let names = Comma(self.0.iter().map(Ident));
        fmt!(f, "(" names ")");
    }
}

/// `"a" = EXCLUDED."a"`
struct Excluded<'a>(&'a String);

impl ToSql for Excluded<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0) " = EXCLUDED." Ident(self.0));
    }
}
