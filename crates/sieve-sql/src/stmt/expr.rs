use super::{ColumnType, Select};

use sieve_core::stmt::Value;

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `AND` over every operand
    And(Vec<Expr>),

    /// Binary operation
    BinaryOp(ExprBinaryOp),

    /// `CAST(expr AS ty)`
    Cast(Box<Expr>, ColumnType),

    /// Reference to a column
    Column(ExprColumn),

    /// Function call, aggregate functions included
    Func(ExprFunc),

    /// `expr` starts with `prefix`, a pattern case-sensitive on every flavor
    BeginsWith(Box<Expr>, String),

    /// Arithmetic negation
    Neg(Box<Expr>),

    /// Logical negation
    Not(Box<Expr>),

    /// `OR` over every operand
    Or(Vec<Expr>),

    /// Scalar sub-select
    Subquery(Box<Select>),

    /// `ARRAY(sub-select)`, collecting a single-column sub-select
    Array(Box<Select>),

    /// A value bound as a parameter. `NULL` is written inline.
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Null-safe equality
    Eq,

    /// Null-safe inequality
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,

    /// String concatenation
    Concat,
}

/// Alias of a table in a `FROM` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableAlias(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct ExprColumn {
    /// `None` in statements reading a single table without aliases.
    pub table: Option<TableAlias>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprFunc {
    pub func: Func,
    pub args: Vec<Expr>,

    /// `FILTER (WHERE ...)` of an aggregate function
    pub filter: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    /// `COUNT(*)` without arguments
    Count,
    Sum,
    Min,
    Max,
    Coalesce,

    /// Length of a string in characters
    Length,
}

impl Expr {
    pub fn column(table: TableAlias, name: impl Into<String>) -> Expr {
        Expr::Column(ExprColumn {
            table: Some(table),
            name: name.into(),
        })
    }

    pub fn binary_op(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    pub fn func(func: Func, args: Vec<Expr>) -> Expr {
        Expr::Func(ExprFunc {
            func,
            args,
            filter: None,
        })
    }

    /// An aggregate function restricted to the rows matching `filter`, when given.
    pub fn aggregate(func: Func, args: Vec<Expr>, filter: Option<Expr>) -> Expr {
        Expr::Func(ExprFunc {
            func,
            args,
            filter: filter.map(Box::new),
        })
    }

    /// Joins `operands` with `AND`. No operand is `TRUE`.
    pub fn and_all(mut operands: Vec<Expr>) -> Expr {
        match operands.len() {
            0 => Expr::Value(Value::Bool(true)),
            1 => operands.remove(0),
            _ => Expr::And(operands),
        }
    }
}
