mod column_def;
pub use column_def::{ColumnDef, ColumnType};

mod create_table;
pub use create_table::CreateTable;

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{BinaryOp, Expr, ExprBinaryOp, ExprColumn, ExprFunc, Func, TableAlias};

mod insert;
pub use insert::Insert;

mod select;
pub use select::{OrderByExpr, Select, SelectColumn, TableFactor, TableRef};

/// A SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    Delete(Delete),
    Insert(Insert),
    Query(Select),
}

impl From<CreateTable> for Statement {
    fn from(value: CreateTable) -> Self {
        Statement::CreateTable(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Query(value)
    }
}
