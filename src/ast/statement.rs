use crate::span::Span;

use super::expression::{Expression, Ident, UnaryOp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assign(Assign),
    Read(Ident),
    Write(Expression),
    Sequence(Vec<Statement>),
    If(If),
    For(For),
    Case(Case),
    Break(Span),
    Continue(Span),
    Exit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub target: Ident,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    /// `Statement::Empty` when there is no `else`
    pub else_branch: Box<Statement>,
}

/// The one loop form every loop statement lowers to.
///
/// `init` runs once, then `condition` is tested before each pass of `body`;
/// `update` runs after the body and is where `continue` lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
    pub init: Box<Statement>,
    pub condition: Expression,
    pub update: Box<Statement>,
    pub body: Box<Statement>,
}

impl For {
    pub fn new(init: Statement, condition: Expression, update: Statement, body: Statement) -> Self {
        Self {
            init: Box::new(init),
            condition,
            update: Box::new(update),
            body: Box::new(body),
        }
    }

    /// `while cond do body end`
    pub fn while_loop(condition: Expression, body: Statement) -> Self {
        Self::new(Statement::Empty, condition, Statement::Empty, body)
    }

    /// `do body while cond`: the body doubles as init so it runs once before
    /// the first test
    pub fn do_while(body: Statement, condition: Expression) -> Self {
        Self::new(body.clone(), condition, Statement::Empty, body)
    }

    /// `repeat body until cond`: a do-while on the negated condition
    pub fn repeat_until(body: Statement, condition: Expression) -> Self {
        let condition = Expression::UnaryOp(UnaryOp::Not(Box::new(condition)));
        Self::do_while(body, condition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub selector: Expression,
    pub clauses: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub value: Expression,
    pub body: Statement,
}
