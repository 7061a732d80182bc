//! Code generation for the target stack machine
//!
//! The generator walks the AST bottom-up, threading one [`Environment`]
//! through every node. Each node returns its own [`Code`]; a parent's code is
//! the concatenation of its children's code with its own instructions in
//! between.
//!
//! ```text
//! ssp <slots>
//! <body>
//! hlt
//! ```

mod env;
mod expression;
mod instruction;
mod statement;

use thiserror::Error;
use tracing::debug;

use crate::ast::Program;
use crate::span::Span;

pub use env::{Environment, LoopLabels};
pub use instruction::{Code, Instruction, Label};

/// A program that parsed but cannot be lowered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("`break` outside of a loop")]
    BreakOutsideLoop { span: Span },
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop { span: Span },
}

impl SemanticError {
    /// Where the offending statement was written
    pub fn span(&self) -> Span {
        match self {
            SemanticError::BreakOutsideLoop { span } | SemanticError::ContinueOutsideLoop { span } => {
                *span
            }
        }
    }
}

pub type CodegenResult<T> = Result<T, SemanticError>;

/// Lower a whole program. The variable count is only known once the body
/// has been generated, so the `ssp` prologue is prepended last.
pub fn generate(program: &Program) -> CodegenResult<Code> {
    let mut env = Environment::new();
    let body = program.body.generate(&mut env)?;

    let mut code = Code::from(vec![Instruction::Ssp(env.allocated())]);
    code.append(body);
    code.push(Instruction::Halt);

    debug!(
        slots = env.allocated(),
        instructions = code.len(),
        "generated code"
    );
    Ok(code)
}
