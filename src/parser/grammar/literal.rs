//! Tokens: keywords, symbols, identifiers and number literals

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{Ident, Number};
use crate::parser::combinators::{
    BoxedParser, literal, many, not_followed_by, recognize_spanned, satisfy, with_span,
};
use crate::parser::state::{ParseState, Parser};
use crate::span::Span;

/// Every reserved word of the language
pub const KEYWORDS: &[&str] = &[
    "read", "write", "if", "then", "else", "end", "for", "do", "while", "repeat", "until",
    "break", "continue", "exit", "match", "of", "case", "and", "or", "xor", "not", "odd",
];

/// Words that can never be used as identifiers
#[derive(Debug, Clone)]
pub struct Keywords {
    words: HashSet<&'static str>,
}

impl Keywords {
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            words: KEYWORDS.iter().copied().collect(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// A keyword: the exact word, not followed by another identifier character.
/// Matched atomically, so trivia can never split it.
pub fn keyword(word: &'static str) -> BoxedParser<&'static str> {
    (literal(word) - not_followed_by(satisfy(is_ident_continue, "letter or digit"))).atomic()
}

/// A keyword together with where it was written
pub fn keyword_span(word: &'static str) -> BoxedParser<Span> {
    with_span(keyword(word)) >> |(_, span)| span
}

/// Punctuation or an operator
pub fn symbol(text: &'static str) -> BoxedParser<&'static str> {
    literal(text)
}

/// ident := letter (letter | digit)*, excluding keywords
pub fn ident(keywords: Rc<Keywords>) -> BoxedParser<Ident> {
    let head = satisfy(is_ident_start, "identifier");
    let tail = many(satisfy(is_ident_continue, "letter or digit").quiet());

    recognize_spanned(head + tail)
        .atomic()
        .filter(move |(name, _)| !keywords.contains(name), "identifier")
        >> |(name, position)| Ident { name, position }
}

/// number := digit+
///
/// A digit run that does not fit in 32 bits is still consumed as a number,
/// so the rest of the statement parses normally; the overflow is reported.
pub fn number() -> BoxedParser<Number> {
    let head = satisfy(|c| c.is_ascii_digit(), "integer literal");
    let tail = many(satisfy(|c| c.is_ascii_digit(), "digit").quiet());
    let digits = recognize_spanned(head + tail).atomic();

    BoxedParser::new(move |state: &mut ParseState| {
        let (text, position) = digits.parse(state)?;
        let value = match i32::from_str_radix(&text, 10) {
            Ok(value) => value,
            Err(_) => {
                state.report(position.start, "integer literal within 32-bit range");
                i32::MAX
            }
        };
        Ok(Number { value, position })
    })
}
