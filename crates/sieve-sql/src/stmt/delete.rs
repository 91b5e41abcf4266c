use super::Expr;

/// `DELETE FROM table WHERE filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,

    /// Conjuncts of the `WHERE` clause. Column references carry no table alias.
    pub filter: Vec<Expr>,
}
