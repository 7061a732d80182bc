use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Ident(Ident),
    Number(Number),
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
    /// Produces no code; stands for a value the machine already pushed
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub value: i32,
    pub position: Span,
}

/// Binary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    Xor,
}

impl BinOpKind {
    /// Source spelling of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Eq => "==",
            BinOpKind::NotEq => "!=",
            BinOpKind::Lt => "<",
            BinOpKind::Gt => ">",
            BinOpKind::LtEq => "<=",
            BinOpKind::GtEq => ">=",
            BinOpKind::And => "and",
            BinOpKind::Or => "or",
            BinOpKind::Xor => "xor",
        }
    }
}

/// Binary operation expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOp {
    pub op: BinOpKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl BinaryOp {
    pub fn new(op: BinOpKind, left: Expression, right: Expression) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Prefix operators. Increment and decrement write back to their operand,
/// so they only accept an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Not(Box<Expression>),
    Odd(Box<Expression>),
    Increment(Ident),
    Decrement(Ident),
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not(_) => "not",
            UnaryOp::Odd(_) => "odd",
            UnaryOp::Increment(_) => "++",
            UnaryOp::Decrement(_) => "--",
        }
    }
}
