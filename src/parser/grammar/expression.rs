//! Expression parsers: a precedence cascade, tightest-binding first

use crate::ast::{BinOpKind, BinaryOp, Expression, UnaryOp};
use crate::parser::combinators::{BoxedParser, choice, many};

use super::Rules;
use super::literal::{ident, keyword, number, symbol};

/// factor := number | ident | "(" expression ")"
pub fn factor(rules: &Rules) -> BoxedParser<Expression> {
    choice(vec![
        number() >> Expression::Number,
        ident(rules.keywords.clone()) >> Expression::Ident,
        symbol("(") * rules.expression.clone().nested() - symbol(")"),
    ])
}

/// unary := "++" ident | "--" ident | "not" unary | "odd" unary | factor
pub fn unary(rules: &Rules) -> BoxedParser<Expression> {
    let target = || ident(rules.keywords.clone());

    choice(vec![
        symbol("++") * target() >> |id| Expression::UnaryOp(UnaryOp::Increment(id)),
        symbol("--") * target() >> |id| Expression::UnaryOp(UnaryOp::Decrement(id)),
        keyword("not") * rules.unary.clone().nested() >> |e| Expression::UnaryOp(UnaryOp::Not(Box::new(e))),
        keyword("odd") * rules.unary.clone().nested() >> |e| Expression::UnaryOp(UnaryOp::Odd(Box::new(e))),
        factor(rules),
    ])
}

fn op(token: BoxedParser<&'static str>, kind: BinOpKind) -> BoxedParser<BinOpKind> {
    token >> move |_| kind
}

/// layer := operand (operator operand)*, folded to the left
fn binary_layer(
    operand: BoxedParser<Expression>,
    operators: Vec<BoxedParser<BinOpKind>>,
) -> BoxedParser<Expression> {
    (operand.clone() + many(choice(operators) + operand))
        >> |(first, rest)| {
            rest.into_iter().fold(first, |left, (op, right)| {
                Expression::BinaryOp(BinaryOp::new(op, left, right))
            })
        }
}

/// term := unary (("*" | "/" | "%") unary)*
fn term(rules: &Rules) -> BoxedParser<Expression> {
    binary_layer(
        rules.unary.clone(),
        vec![
            op(symbol("*"), BinOpKind::Mul),
            op(symbol("/"), BinOpKind::Div),
            op(symbol("%"), BinOpKind::Mod),
        ],
    )
}

/// additive := term (("+" | "-") term)*
fn additive(rules: &Rules) -> BoxedParser<Expression> {
    binary_layer(
        term(rules),
        vec![
            op(symbol("+"), BinOpKind::Add),
            op(symbol("-"), BinOpKind::Sub),
        ],
    )
}

/// relational := additive (("<=" | ">=" | "==" | "!=" | "<" | ">") additive)*
fn relational(rules: &Rules) -> BoxedParser<Expression> {
    binary_layer(
        additive(rules),
        vec![
            op(symbol("<="), BinOpKind::LtEq),
            op(symbol(">="), BinOpKind::GtEq),
            op(symbol("=="), BinOpKind::Eq),
            op(symbol("!="), BinOpKind::NotEq),
            op(symbol("<"), BinOpKind::Lt),
            op(symbol(">"), BinOpKind::Gt),
        ],
    )
}

/// conjunction := relational ("and" relational)*
fn conjunction(rules: &Rules) -> BoxedParser<Expression> {
    binary_layer(relational(rules), vec![op(keyword("and"), BinOpKind::And)])
}

/// expression := conjunction (("or" | "xor") conjunction)*
pub fn expression(rules: &Rules) -> BoxedParser<Expression> {
    binary_layer(
        conjunction(rules),
        vec![
            op(keyword("or"), BinOpKind::Or),
            op(keyword("xor"), BinOpKind::Xor),
        ],
    )
}
