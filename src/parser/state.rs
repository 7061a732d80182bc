use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// A failed match: what went wrong, where, and what would have been accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub expected: Vec<String>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            offset: 0,
            expected: vec![],
        }
    }

    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)?;
        if !self.expected.is_empty() {
            write!(f, ", expected {}", self.expected.join(" or "))?;
        }
        Ok(())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// How deeply parenthesized expressions, prefix operators and statements
/// may nest inside each other
pub const MAX_NESTING: usize = 50;

/// The furthest point a parse attempt reached before failing, together with
/// everything that would have been accepted there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub offset: usize,
    pub expected: BTreeSet<String>,
}

impl Failure {
    fn from_error(err: &ParseError) -> Self {
        Self {
            offset: err.offset,
            expected: err.expected.iter().cloned().collect(),
        }
    }

    /// Keep the further of the two; on a tie, union the expectations
    fn merge(self, other: Failure) -> Failure {
        match self.offset.cmp(&other.offset) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => {
                let mut merged = self;
                merged.expected.extend(other.expected);
                merged
            }
        }
    }
}

/// Snapshot of the scanner used to roll back failed attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    offset: usize,
    committed: usize,
}

/// Cursor over the source text shared by all parsers of one parse
pub struct ParseState {
    source: String,
    offset: usize,
    skip_trivia: bool,
    silent: usize,
    depth: usize,
    furthest: Option<Failure>,
    committed: Vec<Failure>,
}

impl ParseState {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            offset: 0,
            skip_trivia: true,
            silent: 0,
            depth: 0,
            furthest: None,
            committed: vec![],
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn remaining(&self) -> &str {
        &self.source[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_next(&self) -> bool {
        self.offset < self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    /// Consume `len` bytes. Callers only pass lengths of text they matched.
    pub fn advance_by(&mut self, len: usize) {
        self.offset = (self.offset + len).min(self.source.len());
    }

    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset)
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            committed: self.committed.len(),
        }
    }

    /// Roll back to `position`. Failures committed after it are folded back
    /// into the furthest failure instead of being lost.
    pub fn restore(&mut self, position: Position) {
        self.offset = position.offset;
        if self.committed.len() > position.committed {
            let dropped: Vec<_> = self.committed.drain(position.committed..).collect();
            for failure in dropped {
                self.merge_furthest(Some(failure));
            }
        }
    }

    pub fn skips_trivia(&self) -> bool {
        self.skip_trivia
    }

    pub fn set_skip_trivia(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.skip_trivia, enabled)
    }

    /// Consume whitespace, `/* */` and `//` comments unless trivia skipping is
    /// switched off. An unterminated block comment fails at its opening.
    pub fn skip_trivia(&mut self) -> ParseResult<()> {
        if !self.skip_trivia {
            return Ok(());
        }

        loop {
            let rest = self.remaining();
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                self.offset += rest.len() - trimmed.len();
                continue;
            }

            if let Some(body) = rest.strip_prefix("/*") {
                match body.find("*/") {
                    Some(close) => {
                        self.offset += close + 4;
                        continue;
                    }
                    None => {
                        let err = ParseError::new("unterminated block comment")
                            .expected("`*/`")
                            .at(self.offset);
                        self.record_error(&err);
                        return Err(err);
                    }
                }
            }

            if rest.starts_with("//") {
                self.offset += rest.find('\n').unwrap_or(rest.len());
                continue;
            }

            return Ok(());
        }
    }

    /// Build an error at the current offset and record it
    pub fn fail(&mut self, message: &str, expected: &str) -> ParseError {
        let err = ParseError::new(message)
            .expected(expected)
            .at(self.offset);
        self.record_error(&err);
        err
    }

    pub fn record_error(&mut self, err: &ParseError) {
        if self.silent == 0 {
            self.merge_furthest(Some(Failure::from_error(err)));
        }
    }

    pub fn enter_silent(&mut self) {
        self.silent += 1;
    }

    pub fn leave_silent(&mut self) {
        self.silent = self.silent.saturating_sub(1);
    }

    /// Go one nesting level deeper, failing past [`MAX_NESTING`]
    pub fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            self.skip_trivia()?;
            let expected = format!("at most {MAX_NESTING} levels of nesting");
            return Err(self.fail("nesting too deep", &expected));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn get_furthest_error(&self) -> Option<&Failure> {
        self.furthest.as_ref()
    }

    pub fn take_furthest(&mut self) -> Option<Failure> {
        self.furthest.take()
    }

    pub fn merge_furthest(&mut self, failure: Option<Failure>) {
        self.furthest = match (self.furthest.take(), failure) {
            (Some(current), Some(new)) => Some(current.merge(new)),
            (current, new) => current.or(new),
        };
    }

    /// Move the furthest failure into the committed list. Used when a broken
    /// statement is skipped so that the next error is tracked on its own.
    pub fn commit_furthest_error(&mut self) {
        let failure = self.furthest.take().unwrap_or_else(|| Failure {
            offset: self.offset,
            expected: BTreeSet::new(),
        });
        self.committed.push(failure);
    }

    /// Record a failure without failing the parse. The parser carries on
    /// with a stand-in value, but the parse as a whole is rejected.
    pub fn report(&mut self, offset: usize, expected: &str) {
        if self.silent == 0 {
            self.committed.push(Failure {
                offset,
                expected: BTreeSet::from([expected.to_string()]),
            });
        }
    }

    pub fn has_recovered(&self) -> bool {
        !self.committed.is_empty()
    }

    /// All failures of this parse: committed ones first, then the outstanding
    /// furthest failure if `include_furthest` is set
    pub fn take_failures(&mut self, include_furthest: bool) -> Vec<Failure> {
        let mut failures = std::mem::take(&mut self.committed);
        if include_furthest {
            failures.extend(self.furthest.take());
        }
        failures
    }
}

pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

// Allow closures to be parsers
impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
