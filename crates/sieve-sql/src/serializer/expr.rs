use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use crate::stmt;
use sieve_core::stmt::Value;

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            stmt::Expr::And(operands) => {
                let operands = Delimited(operands, " AND ");
                fmt!(f, "(" operands ")");
            }
            stmt::Expr::Array(select) => {
                let select = &**select;
                fmt!(f, "ARRAY(" select ")");
            }
            stmt::Expr::BeginsWith(expr, prefix) => {
                let expr = &**expr;
                // LIKE is case-insensitive on sqlite, GLOB is not.
                let (op, pattern) = if f.serializer.is_sqlite() {
                    (" GLOB ", format!("{prefix}*"))
                } else {
                    (" LIKE ", format!("{}%", escape_like(prefix)))
                };
                let pattern = &Value::String(pattern);
                fmt!(f, expr op pattern);
            }
            stmt::Expr::BinaryOp(expr) => {
                let lhs = &*expr.lhs;
                let rhs = &*expr.rhs;
                fmt!(f, "(" lhs expr.op rhs ")");
            }
            stmt::Expr::Cast(expr, ty) => {
                let expr = &**expr;
                let ty = *ty;
                fmt!(f, "CAST(" expr " AS " ty ")");
            }
            stmt::Expr::Column(column) => column.to_sql(f),
            stmt::Expr::Func(func) => func.to_sql(f),
            stmt::Expr::Neg(expr) => {
                let expr = &**expr;
                fmt!(f, "(-" expr ")");
            }
            stmt::Expr::Not(expr) => {
                let expr = &**expr;
                fmt!(f, "(NOT " expr ")");
            }
            stmt::Expr::Or(operands) => {
                let operands = Delimited(operands, " OR ");
                fmt!(f, "(" operands ")");
            }
            stmt::Expr::Subquery(select) => {
                let select = &**select;
                fmt!(f, "(" select ")");
            }
            stmt::Expr::Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);
        match self.table {
            Some(table) => fmt!(f, table "." name),
            None => fmt!(f, name),
        }
    }
}

impl ToSql for stmt::TableAlias {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "tbl_" self.0);
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let sqlite = f.serializer.is_sqlite();
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq if sqlite => " IS ",
            stmt::BinaryOp::Eq => " IS NOT DISTINCT FROM ",
            stmt::BinaryOp::Ne if sqlite => " IS NOT ",
            stmt::BinaryOp::Ne => " IS DISTINCT FROM ",
            stmt::BinaryOp::Lt => " < ",
            stmt::BinaryOp::Le => " <= ",
            stmt::BinaryOp::Gt => " > ",
            stmt::BinaryOp::Ge => " >= ",
            stmt::BinaryOp::Add => " + ",
            stmt::BinaryOp::Sub => " - ",
            stmt::BinaryOp::Mul => " * ",
            stmt::BinaryOp::Div => " / ",
            stmt::BinaryOp::Concat => " || ",
        })
    }
}

impl ToSql for &stmt::ExprFunc {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = match self.func {
            stmt::Func::Count => "COUNT",
            stmt::Func::Sum => "SUM",
            stmt::Func::Min => "MIN",
            stmt::Func::Max => "MAX",
            stmt::Func::Coalesce => "COALESCE",
            stmt::Func::Length if f.serializer.is_sqlite() => "LENGTH",
            stmt::Func::Length => "CHAR_LENGTH",
        };

        if self.func == stmt::Func::Count && self.args.is_empty() {
            fmt!(f, name "(*)");
        } else {
            let args = Comma(&self.args);
            fmt!(f, name "(" args ")");
        }

        if let Some(filter) = &self.filter {
            let filter = &**filter;
            fmt!(f, " FILTER (WHERE " filter ")");
        }
    }
}

/// Escapes the `LIKE` wildcards of `prefix`, using postgres' default escape character.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
