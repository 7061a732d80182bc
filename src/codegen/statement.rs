use crate::ast::{Assign, BinOpKind, Case, Expression, For, If, Statement};

use super::env::{Environment, LoopLabels};
use super::instruction::{Code, Instruction};
use super::{CodegenResult, SemanticError};

impl Statement {
    /// Code for one statement. Statements leave the stack as they found it.
    pub fn generate(&self, env: &mut Environment) -> CodegenResult<Code> {
        match self {
            Statement::Assign(assign) => Ok(assign.generate(env)),
            Statement::Read(target) => {
                // The value read is already on the stack, so the assigned
                // expression itself emits nothing
                let mut code = Code::from(vec![Instruction::Input]);
                code.append(
                    Assign {
                        target: target.clone(),
                        value: Expression::Empty,
                    }
                    .generate(env),
                );
                Ok(code)
            }
            Statement::Write(value) => {
                let mut code = value.generate(env);
                code.push(Instruction::OutputInt)
                    .push(Instruction::LoadChar('\n'))
                    .push(Instruction::OutputChar);
                Ok(code)
            }
            Statement::Sequence(statements) => {
                let mut code = Code::new();
                for statement in statements {
                    code.append(statement.generate(env)?);
                }
                Ok(code)
            }
            Statement::If(if_stmt) => if_stmt.generate(env),
            Statement::For(for_loop) => for_loop.generate(env),
            Statement::Case(case) => case.generate(env),
            Statement::Break(span) => {
                let labels = env
                    .innermost_loop()
                    .ok_or(SemanticError::BreakOutsideLoop { span: *span })?;
                Ok(Code::from(vec![Instruction::Jump(labels.break_label.clone())]))
            }
            Statement::Continue(span) => {
                let labels = env
                    .innermost_loop()
                    .ok_or(SemanticError::ContinueOutsideLoop { span: *span })?;
                Ok(Code::from(vec![Instruction::Jump(
                    labels.continue_label.clone(),
                )]))
            }
            Statement::Exit => Ok(Code::from(vec![Instruction::Halt])),
            Statement::Empty => Ok(Code::new()),
        }
    }
}

impl Assign {
    /// The target is numbered before anything in the value, so in `x := y`
    /// `x` gets the lower slot
    fn generate(&self, env: &mut Environment) -> Code {
        let store = self.target.store(env);
        let mut code = self.value.generate(env);
        code.append(store);
        code
    }
}

impl If {
    fn generate(&self, env: &mut Environment) -> CodegenResult<Code> {
        let else_label = env.fresh_label("else");
        let end_label = env.fresh_label("endif");

        let mut code = self.condition.generate(env);
        code.push(Instruction::JumpIfFalse(else_label.clone()));
        code.append(self.then_branch.generate(env)?);
        code.push(Instruction::Jump(end_label.clone()))
            .push(Instruction::Define(else_label));
        code.append(self.else_branch.generate(env)?);
        code.push(Instruction::Define(end_label));
        Ok(code)
    }
}

impl For {
    fn generate(&self, env: &mut Environment) -> CodegenResult<Code> {
        let labels = env.enter_loop();
        let code = self.generate_in_loop(&labels, env);
        env.leave_loop();
        code
    }

    /// init; start: cond; fjp end; body; continue: update; ujp start; end:
    ///
    /// The loop's labels are in scope from `init` on, so a body reused as
    /// `init` (do-while, repeat-until) breaks out of and continues this loop.
    fn generate_in_loop(&self, labels: &LoopLabels, env: &mut Environment) -> CodegenResult<Code> {
        let start_label = env.fresh_label("loop");

        let mut code = self.init.generate(env)?;
        code.push(Instruction::Define(start_label.clone()));
        code.append(self.condition.generate(env));
        code.push(Instruction::JumpIfFalse(labels.break_label.clone()));
        code.append(self.body.generate(env)?);
        code.push(Instruction::Define(labels.continue_label.clone()));
        code.append(self.update.generate(env)?);
        code.push(Instruction::Jump(start_label))
            .push(Instruction::Define(labels.break_label.clone()));
        Ok(code)
    }
}

impl Case {
    /// The selector is evaluated once and stays on the stack while the
    /// clauses compare against copies of it. It is popped on every way out.
    fn generate(&self, env: &mut Environment) -> CodegenResult<Code> {
        let end_label = env.fresh_label("endcase");

        let mut code = self.selector.generate(env);
        for clause in &self.clauses {
            let next_label = env.fresh_label("case");
            code.push(Instruction::Duplicate);
            code.append(clause.value.generate(env));
            code.push(Instruction::Binary(BinOpKind::Eq))
                .push(Instruction::JumpIfFalse(next_label.clone()))
                .push(Instruction::Pop);
            code.append(clause.body.generate(env)?);
            code.push(Instruction::Jump(end_label.clone()))
                .push(Instruction::Define(next_label));
        }
        code.push(Instruction::Pop)
            .push(Instruction::Define(end_label));
        Ok(code)
    }
}
