//! Pretty printer for zpc source code
//!
//! This module provides Display implementations for the AST. The output is
//! valid source again: expressions get only the parentheses their precedence
//! needs, and statements are laid out one per line with nested bodies
//! indented. Loops are printed in the most specific surface form their
//! `For` node matches.

use std::fmt::{self, Display};

use crate::ast::{
    BinOpKind, BinaryOp, Case, Expression, For, If, Program, Statement, UnaryOp,
};

const INDENT: &str = "  ";

struct Formatter {
    buffer: String,
    indent_level: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_sequence(&self.body, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_statement(self, &mut formatter);
        write!(f, "{}", formatter.finish())
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expression(self, &mut formatter, 0);
        write!(f, "{}", formatter.finish())
    }
}

/// Every statement of a body on its own indented line, `;`-separated
fn format_sequence(stmt: &Statement, fmt: &mut Formatter) {
    let stmts = match stmt {
        Statement::Sequence(stmts) => stmts.as_slice(),
        Statement::Empty => &[],
        single => std::slice::from_ref(single),
    };

    for (i, stmt) in stmts.iter().enumerate() {
        if i > 0 {
            fmt.write_str(";");
            fmt.write_newline();
        }
        fmt.write_indent();
        format_statement(stmt, fmt);
    }
    if !stmts.is_empty() {
        fmt.write_newline();
    }
}

/// An indented body between two keyword lines
fn format_body(body: &Statement, fmt: &mut Formatter) {
    fmt.write_newline();
    fmt.indent();
    format_sequence(body, fmt);
    fmt.dedent();
    fmt.write_indent();
}

fn format_statement(stmt: &Statement, fmt: &mut Formatter) {
    match stmt {
        Statement::Assign(assign) => {
            fmt.write_str(&assign.target.name);
            fmt.write_str(" := ");
            format_expression(&assign.value, fmt, 0);
        }
        Statement::Read(target) => {
            fmt.write_str("read ");
            fmt.write_str(&target.name);
        }
        Statement::Write(value) => {
            fmt.write_str("write ");
            format_expression(value, fmt, 0);
        }
        Statement::Sequence(stmts) => {
            // A nested sequence has no syntax of its own; flatten it inline
            for (i, stmt) in stmts.iter().enumerate() {
                if i > 0 {
                    fmt.write_str("; ");
                }
                format_statement(stmt, fmt);
            }
        }
        Statement::If(if_stmt) => format_if(if_stmt, fmt),
        Statement::For(for_loop) => format_for(for_loop, fmt),
        Statement::Case(case) => format_case(case, fmt),
        Statement::Break(_) => fmt.write_str("break"),
        Statement::Continue(_) => fmt.write_str("continue"),
        Statement::Exit => fmt.write_str("exit"),
        Statement::Empty => {}
    }
}

fn format_if(if_stmt: &If, fmt: &mut Formatter) {
    fmt.write_str("if ");
    format_expression(&if_stmt.condition, fmt, 0);
    fmt.write_str(" then");
    format_body(&if_stmt.then_branch, fmt);

    if *if_stmt.else_branch != Statement::Empty {
        fmt.write_str("else");
        format_body(&if_stmt.else_branch, fmt);
    }
    fmt.write_str("end");
}

fn format_for(for_loop: &For, fmt: &mut Formatter) {
    let no_update = *for_loop.update == Statement::Empty;

    if *for_loop.init == Statement::Empty && no_update {
        fmt.write_str("while ");
        format_expression(&for_loop.condition, fmt, 0);
        fmt.write_str(" do");
        format_body(&for_loop.body, fmt);
        fmt.write_str("end");
        return;
    }

    // The body runs once up front: do-while, or repeat-until when the
    // condition is a negation
    if for_loop.init == for_loop.body && no_update {
        match &for_loop.condition {
            Expression::UnaryOp(UnaryOp::Not(until)) => {
                fmt.write_str("repeat");
                format_body(&for_loop.body, fmt);
                fmt.write_str("until ");
                format_expression(until, fmt, 0);
            }
            condition => {
                fmt.write_str("do");
                format_body(&for_loop.body, fmt);
                fmt.write_str("while ");
                format_expression(condition, fmt, 0);
            }
        }
        return;
    }

    fmt.write_str("for ");
    format_statement(&for_loop.init, fmt);
    fmt.write_str("; ");
    format_expression(&for_loop.condition, fmt, 0);
    fmt.write_str("; ");
    format_statement(&for_loop.update, fmt);
    if !no_update {
        fmt.write_str(" ");
    }
    fmt.write_str("do");
    format_body(&for_loop.body, fmt);
    fmt.write_str("end");
}

fn format_case(case: &Case, fmt: &mut Formatter) {
    fmt.write_str("match ");
    format_expression(&case.selector, fmt, 0);
    fmt.write_str(" of");
    fmt.write_newline();

    fmt.indent();
    for clause in &case.clauses {
        fmt.write_indent();
        fmt.write_str("case ");
        format_expression(&clause.value, fmt, 0);
        fmt.write_str(" =>");
        format_body(&clause.body, fmt);
        // The clause ends where the next `case` (or `end`) begins
        fmt.buffer.truncate(fmt.buffer.trim_end_matches(' ').len());
    }
    fmt.dedent();

    fmt.write_indent();
    fmt.write_str("end");
}

fn format_expression(expr: &Expression, fmt: &mut Formatter, precedence: u8) {
    match expr {
        Expression::Ident(ident) => fmt.write_str(&ident.name),
        Expression::Number(number) => fmt.write_str(&number.value.to_string()),
        Expression::BinaryOp(binop) => format_binary_op(binop, fmt, precedence),
        Expression::UnaryOp(unop) => format_unary_op(unop, fmt, precedence),
        Expression::Empty => {}
    }
}

fn format_binary_op(binop: &BinaryOp, fmt: &mut Formatter, parent_prec: u8) {
    let op_prec = binop_precedence(binop.op);
    let needs_parens = op_prec < parent_prec;

    if needs_parens {
        fmt.write_str("(");
    }

    format_expression(&binop.left, fmt, op_prec);
    fmt.write_str(" ");
    fmt.write_str(binop.op.symbol());
    fmt.write_str(" ");
    // Every layer folds to the left, so a right operand at the same level
    // needs parentheses
    format_expression(&binop.right, fmt, op_prec + 1);

    if needs_parens {
        fmt.write_str(")");
    }
}

fn format_unary_op(unop: &UnaryOp, fmt: &mut Formatter, parent_prec: u8) {
    let needs_parens = UNARY_PRECEDENCE < parent_prec;

    if needs_parens {
        fmt.write_str("(");
    }

    fmt.write_str(unop.symbol());
    match unop {
        UnaryOp::Not(operand) | UnaryOp::Odd(operand) => {
            fmt.write_str(" ");
            format_expression(operand, fmt, UNARY_PRECEDENCE);
        }
        UnaryOp::Increment(target) | UnaryOp::Decrement(target) => fmt.write_str(&target.name),
    }

    if needs_parens {
        fmt.write_str(")");
    }
}

const UNARY_PRECEDENCE: u8 = 6;

fn binop_precedence(kind: BinOpKind) -> u8 {
    match kind {
        BinOpKind::Or | BinOpKind::Xor => 1,
        BinOpKind::And => 2,
        BinOpKind::Eq
        | BinOpKind::NotEq
        | BinOpKind::Lt
        | BinOpKind::Gt
        | BinOpKind::LtEq
        | BinOpKind::GtEq => 3,
        BinOpKind::Add | BinOpKind::Sub => 4,
        BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => 5,
    }
}
