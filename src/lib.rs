//! # zpc - a compiler for a small imperative language
//!
//! zpc translates programs of a small imperative language (assignment,
//! arithmetic/relational/logical expressions, `if`, `for`, `while`,
//! `do`-`while`, `repeat`-`until`, `match`/`case`, `break`/`continue`/`exit`,
//! `read`/`write`) into the text instruction stream of a stack machine.
//!
//! ## Architecture Overview
//!
//! The compiler pipeline consists of the following stages:
//!
//! 1. **Parser** (`parser`) - A scannerless combinator engine. Whitespace and
//!    comments are skipped between tokens, failures are tracked at the
//!    furthest offset any attempt reached.
//! 2. **Grammar** (`parser::Grammar`) - Built once from the engine, produces
//!    the AST and recovers from broken statements to find several errors
//!    per pass.
//! 3. **Code generation** (`codegen`) - Walks the AST with a fresh
//!    `Environment` (variable slots, loop labels) and emits instructions.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Grammar] → AST (ast::Program)    or failures → error::CompileError
//!     ↓
//! [Codegen] → codegen::Code         or error::CompileError::Semantic
//!     ↓
//! Instruction text (String)
//! ```
//!
//! ## Module Structure
//!
//! - [`ast`] - Abstract Syntax Tree definitions
//! - [`parser`] - Parser combinators and the grammar
//! - [`codegen`] - Instruction set and code generation
//! - [`error`] - Diagnostics and compile errors
//! - [`fmt`] - Pretty-printing of the AST
//! - [`span`] - Byte spans and line/column lookup
//!
//! ## Example Program
//!
//! ```text
//! i := 0;
//! repeat
//!   write i;
//!   i := i + 1
//! until i == 3
//! ```
//!
//! ## Getting Started
//!
//! ```
//! let code = zpc::compile("write 1 + 1 * 2").unwrap();
//! assert!(code.starts_with("ssp 0\n"));
//! assert!(code.ends_with("hlt\n"));
//! ```

pub mod ast;
pub mod codegen;
pub mod error;
pub mod fmt;
pub mod parser;
pub mod span;

use tracing::debug;

use ast::Program;
use error::{CompileError, Diagnostic, syntax_diagnostics};
use parser::{Failure, Grammar, ParseState};
use span::LineIndex;

/// A reusable compiler. The grammar is built once and shared read-only by
/// every call; all other state belongs to a single call.
#[derive(Default)]
pub struct Compiler {
    grammar: Grammar,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` into a program. Any failure, even one the parser
    /// recovered from, is an error.
    pub fn parse(&self, source: &str) -> Result<Program, CompileError> {
        let mut state = ParseState::new(source);
        let (program, mut failures) = self.grammar.parse(&mut state);

        match program {
            Some(program) if failures.is_empty() => Ok(program),
            _ => {
                if failures.is_empty() {
                    failures.extend(state.take_furthest());
                }
                if failures.is_empty() {
                    failures.push(Failure {
                        offset: state.offset(),
                        expected: Default::default(),
                    });
                }
                let diagnostics = syntax_diagnostics(source, failures);
                debug!(errors = diagnostics.len(), "rejected program");
                Err(CompileError::Syntax(diagnostics))
            }
        }
    }

    /// Compile `source` to instruction text
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let program = self.parse(source)?;
        let code = codegen::generate(&program).map_err(|err| {
            CompileError::Semantic(Diagnostic::from_semantic(&LineIndex::new(source), &err))
        })?;
        Ok(code.to_string())
    }
}

/// Compile `source` with a one-off [`Compiler`]
pub fn compile(source: &str) -> Result<String, CompileError> {
    Compiler::new().compile(source)
}

/// Parse `source` with a one-off [`Compiler`]
pub fn parse(source: &str) -> Result<Program, CompileError> {
    Compiler::new().parse(source)
}
