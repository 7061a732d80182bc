pub mod expression;
pub mod statement;

pub use expression::{BinOpKind, BinaryOp, Expression, Ident, Number, UnaryOp};
pub use statement::{Assign, Case, CaseClause, For, If, Statement};

/// A whole program: one flat statement sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub body: Statement,
}
