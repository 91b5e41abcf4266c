use super::{Formatter, Ident, Params, ToSql};

use crate::stmt;

impl ToSql for &stmt::ColumnDef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);
        fmt!(f, name " " self.ty);
    }
}

impl ToSql for stmt::ColumnType {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let sqlite = f.serializer.is_sqlite();
        f.dst.push_str(match self {
            stmt::ColumnType::Boolean => "BOOLEAN",
            stmt::ColumnType::Integer if sqlite => "INTEGER",
            stmt::ColumnType::Integer => "BIGINT",
            stmt::ColumnType::Real if sqlite => "REAL",
            stmt::ColumnType::Real => "DOUBLE PRECISION",
            stmt::ColumnType::Text => "TEXT",
        });
    }
}
