//! Statement parsers and statement sequences with error recovery

use crate::ast::{Assign, Case, CaseClause, For, If, Statement};
use crate::parser::combinators::{
    BoxedParser, choice, end_of_input, followed_by, many, optional, sep_by,
};
use crate::parser::state::ParseState;

use super::Rules;
use super::literal::{ident, keyword, keyword_span, symbol};

/// assignment := ident ":=" expression
fn assignment(rules: &Rules) -> BoxedParser<Statement> {
    ((ident(rules.keywords.clone()) - symbol(":=")) + rules.expression.clone())
        >> |(target, value)| Statement::Assign(Assign { target, value })
}

/// read := "read" ident
fn read(rules: &Rules) -> BoxedParser<Statement> {
    keyword("read") * ident(rules.keywords.clone()) >> Statement::Read
}

/// write := "write" expression
fn write(rules: &Rules) -> BoxedParser<Statement> {
    keyword("write") * rules.expression.clone() >> Statement::Write
}

/// if := "if" expression "then" sequence ["else" sequence] "end"
fn if_then_else(rules: &Rules) -> BoxedParser<Statement> {
    let else_branch = optional(keyword("else") * rules.sequence.clone());

    (keyword("if") * rules.expression.clone() - keyword("then")) + rules.sequence.clone()
        + else_branch
        - keyword("end")
        >> |((condition, then_branch), else_branch)| {
            Statement::If(If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch.unwrap_or(Statement::Empty)),
            })
        }
}

/// for := "for" ("(" header ")" | header) "do" sequence "end"
/// header := [statement] ";" expression ";" [statement]
fn for_loop(rules: &Rules) -> BoxedParser<Statement> {
    let header = (optional(rules.statement.clone()) - symbol(";")) + rules.expression.clone()
        - symbol(";")
        + optional(rules.statement.clone());
    let header = (symbol("(") * header.clone() - symbol(")")) | header;

    keyword("for") * header - keyword("do") + rules.sequence.clone() - keyword("end")
        >> |(((init, condition), update), body)| {
            Statement::For(For::new(
                init.unwrap_or(Statement::Empty),
                condition,
                update.unwrap_or(Statement::Empty),
                body,
            ))
        }
}

/// do_while := "do" sequence "while" expression
fn do_while(rules: &Rules) -> BoxedParser<Statement> {
    keyword("do") * rules.sequence.clone() - keyword("while") + rules.expression.clone()
        >> |(body, condition)| Statement::For(For::do_while(body, condition))
}

/// while := "while" expression "do" sequence "end"
fn while_loop(rules: &Rules) -> BoxedParser<Statement> {
    keyword("while") * rules.expression.clone() - keyword("do") + rules.sequence.clone()
        - keyword("end")
        >> |(condition, body)| Statement::For(For::while_loop(condition, body))
}

/// repeat := "repeat" sequence "until" expression
fn repeat_until(rules: &Rules) -> BoxedParser<Statement> {
    keyword("repeat") * rules.sequence.clone() - keyword("until") + rules.expression.clone()
        >> |(body, condition)| Statement::For(For::repeat_until(body, condition))
}

/// match := "match" expression "of" clause* "end"
/// clause := "case" expression "=>" sequence
fn match_case(rules: &Rules) -> BoxedParser<Statement> {
    let clause = (keyword("case") * rules.expression.clone() - symbol("=>"))
        + rules.sequence.clone()
        >> |(value, body)| CaseClause { value, body };

    keyword("match") * rules.expression.clone() - keyword("of") + many(clause) - keyword("end")
        >> |(selector, clauses)| Statement::Case(Case { selector, clauses })
}

/// statement := read | write | if | for | do_while | while | repeat | match
///            | "break" | "continue" | "exit" | assignment
pub fn statement(rules: &Rules) -> BoxedParser<Statement> {
    choice(vec![
        read(rules),
        write(rules),
        if_then_else(rules),
        for_loop(rules),
        do_while(rules),
        while_loop(rules),
        repeat_until(rules),
        match_case(rules),
        keyword_span("break") >> Statement::Break,
        keyword_span("continue") >> Statement::Continue,
        keyword("exit") >> |_| Statement::Exit,
        assignment(rules),
    ])
}

/// Tokens that end a statement sequence
fn closing() -> BoxedParser<()> {
    choice(vec![
        symbol(";") >> |_| (),
        end_of_input(),
        keyword("end") >> |_| (),
        keyword("else") >> |_| (),
        keyword("until") >> |_| (),
        keyword("while") >> |_| (),
        keyword("case") >> |_| (),
    ])
}

/// Skip a broken statement up to the next `;` and stand in an empty one.
/// The failure that broke it is committed so it gets reported.
fn recover() -> BoxedParser<Statement> {
    BoxedParser::new(|state: &mut ParseState| {
        state.commit_furthest_error();
        // A `;` inside a comment does not end the statement. An unterminated
        // comment stops the skip and fails the sequence after it.
        while state.skip_trivia().is_ok() {
            match state.peek() {
                Some(';') | None => break,
                Some(_) => {
                    state.advance();
                }
            }
        }
        Ok(Statement::Empty)
    })
}

/// sequence := item (";" item)*
/// item := statement | <empty before a closing token> | <recovery>
pub fn sequence(rules: &Rules) -> BoxedParser<Statement> {
    let item = choice(vec![
        rules.statement.clone(),
        followed_by(closing()) >> |_| Statement::Empty,
        recover(),
    ]);

    sep_by(item, symbol(";"))
        >> |items| {
            Statement::Sequence(
                items
                    .into_iter()
                    .filter(|stmt| *stmt != Statement::Empty)
                    .collect(),
            )
        }
}
