//! Grammar module for the zpc language
//!
//! This module contains all the parsing rules organized by category:
//! - `literal`: keywords, symbols, identifiers and integers
//! - `expression`: the operator precedence cascade
//! - `statement`: statements and statement sequences
//!
//! The grammar is recursive (parenthesized expressions, nested statement
//! bodies), so it is built in two phases: every recursive rule is declared as
//! a [`Rule`] handle first, the builders receive lazy references to those
//! handles, and only then are the rule bodies defined. The [`Grammar`] owns
//! the handles and therefore the whole rule graph.

mod expression;
mod literal;
mod statement;

use std::rc::Rc;

use tracing::debug;

use crate::ast::{Expression, Program, Statement};

use super::combinators::{BoxedParser, Rule, end_of_input};
use super::state::{Failure, ParseState, Parser};

pub use literal::{KEYWORDS, Keywords};

/// Lazy references to the recursive rules, handed to every builder
#[derive(Clone)]
pub(crate) struct Rules {
    pub keywords: Rc<Keywords>,
    pub expression: BoxedParser<Expression>,
    pub unary: BoxedParser<Expression>,
    pub statement: BoxedParser<Statement>,
    pub sequence: BoxedParser<Statement>,
}

/// The complete grammar. Built once, then used for any number of parses.
pub struct Grammar {
    keywords: Rc<Keywords>,
    expression: Rule<Expression>,
    unary: Rule<Expression>,
    statement: Rule<Statement>,
    sequence: Rule<Statement>,
}

impl Grammar {
    pub fn new() -> Self {
        let expression = Rule::declare("expression");
        let unary = Rule::declare("unary");
        let statement = Rule::declare("statement");
        let sequence = Rule::declare("sequence");

        let keywords = Rc::new(Keywords::default());
        let rules = Rules {
            keywords: keywords.clone(),
            expression: expression.parser(),
            unary: unary.parser(),
            statement: statement.parser(),
            sequence: sequence.parser(),
        };

        unary.define(expression::unary(&rules));
        expression.define(expression::expression(&rules).label("expression"));
        statement.define(statement::statement(&rules).label("statement").nested());
        sequence.define(statement::sequence(&rules));

        Self {
            keywords,
            expression,
            unary,
            statement,
            sequence,
        }
    }

    /// Reserved words of this grammar
    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// Parser for a single expression; valid while the grammar is alive
    pub fn expression(&self) -> BoxedParser<Expression> {
        self.expression.parser()
    }

    /// Parser for a single prefix-operator operand
    pub fn unary(&self) -> BoxedParser<Expression> {
        self.unary.parser()
    }

    /// Parser for a single statement, without recovery
    pub fn statement(&self) -> BoxedParser<Statement> {
        self.statement.parser()
    }

    /// Parser for a `;`-separated statement sequence, with recovery
    pub fn sequence(&self) -> BoxedParser<Statement> {
        self.sequence.parser()
    }

    /// Parse a complete program from the source held by `state`.
    ///
    /// program := sequence <end of input>
    ///
    /// Returns the program (if one could be built) along with every failure
    /// found. Any failure, including a recovered one, means the program must
    /// not be compiled.
    pub fn parse(&self, state: &mut ParseState) -> (Option<Program>, Vec<Failure>) {
        debug!(bytes = state.source().len(), "parsing program");

        let body = self.sequence().parse(state);
        let at_end = end_of_input().parse(state);

        let (program, failures) = match (body, at_end) {
            (Ok(body), Ok(())) if !state.has_recovered() => (Some(Program { body }), vec![]),
            (Ok(body), Ok(())) => (Some(Program { body }), state.take_failures(false)),
            (body, _) => (body.ok().map(|body| Program { body }), state.take_failures(true)),
        };

        debug!(failures = failures.len(), "parsed program");
        (program, failures)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}
