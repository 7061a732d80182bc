//! Compile errors and their rendering
//!
//! Parse failures are positions plus the set of things that would have been
//! accepted there. This module resolves them to line/column diagnostics and
//! renders each one as a caret-annotated snippet of the offending line.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::codegen::SemanticError;
use crate::parser::Failure;
use crate::span::LineIndex;

/// At most this many syntax diagnostics are shown per compile
pub const MAX_DIAGNOSTICS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// No token can start at the position
    Lexical,
    /// No grammar alternative matches
    Syntax,
    /// The program parsed but cannot be compiled
    Semantic,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical => f.write_str("lexical error"),
            DiagnosticKind::Syntax => f.write_str("syntax error"),
            DiagnosticKind::Semantic => f.write_str("semantic error"),
        }
    }
}

/// One located problem in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    pub message: String,
    pub source_line: String,
    pub expected: Vec<String>,
}

impl Diagnostic {
    /// Resolve a parse failure against the source it came from
    pub fn from_failure(source: &str, index: &LineIndex, failure: &Failure) -> Self {
        let location = index.locate(failure.offset);
        let found = source.get(failure.offset..).and_then(|rest| rest.chars().next());
        let unterminated = failure.expected.contains("`*/`");

        let (kind, message) = match found {
            _ if unterminated => (DiagnosticKind::Lexical, "unterminated block comment".to_string()),
            Some(c) if !in_alphabet(c) => {
                (DiagnosticKind::Lexical, format!("unexpected character `{}`", c.escape_default()))
            }
            Some(_) => (DiagnosticKind::Syntax, "unexpected input".to_string()),
            None => (DiagnosticKind::Syntax, "unexpected end of input".to_string()),
        };

        Diagnostic {
            kind,
            line: location.line,
            column: location.column,
            message,
            source_line: index.line_text(location.line).to_string(),
            expected: failure.expected.iter().cloned().collect(),
        }
    }

    pub fn from_semantic(index: &LineIndex, err: &SemanticError) -> Self {
        let location = index.locate(err.span().start);
        Diagnostic {
            kind: DiagnosticKind::Semantic,
            line: location.line,
            column: location.column,
            message: err.to_string(),
            source_line: index.line_text(location.line).to_string(),
            expected: vec![],
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} at line {}, column {}: {}",
            self.kind, self.line, self.column, self.message
        )?;

        let gutter = self.line.to_string();
        let pad = " ".repeat(gutter.len());
        writeln!(f, "{gutter} | {}", self.source_line)?;
        write!(f, "{pad} | {}^", " ".repeat(self.column - 1))?;
        if !self.expected.is_empty() {
            write!(f, " expected {}", self.expected.join(", "))?;
        }
        Ok(())
    }
}

/// Characters that can appear in some token, comment or whitespace run
fn in_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || ":=+-*/%<>!();".contains(c)
}

/// Turn the failures of one parse into at most [`MAX_DIAGNOSTICS`]
/// diagnostics. Failures at the same offset are merged; the rest are shown
/// in source order.
pub fn syntax_diagnostics(source: &str, failures: Vec<Failure>) -> Vec<Diagnostic> {
    let mut by_offset: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for failure in failures {
        by_offset.entry(failure.offset).or_default().extend(failure.expected);
    }

    let index = LineIndex::new(source);
    by_offset
        .into_iter()
        .take(MAX_DIAGNOSTICS)
        .map(|(offset, expected)| Diagnostic::from_failure(source, &index, &Failure { offset, expected }))
        .collect()
}

/// Everything that can stop a compile. No output is produced in either case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{}", render(.0))]
    Syntax(Vec<Diagnostic>),
    #[error("{0}")]
    Semantic(Diagnostic),
}

impl CompileError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Syntax(diagnostics) => diagnostics,
            CompileError::Semantic(diagnostic) => std::slice::from_ref(diagnostic),
        }
    }
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
