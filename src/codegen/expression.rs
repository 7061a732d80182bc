use crate::ast::{BinOpKind, BinaryOp, Expression, Ident, Number, UnaryOp};

use super::env::Environment;
use super::instruction::{Code, Instruction};

impl Expression {
    /// Code that leaves the expression's value on top of the stack.
    ///
    /// Operands are always evaluated left to right and in full; `and`/`or`
    /// do not short-circuit.
    pub fn generate(&self, env: &mut Environment) -> Code {
        match self {
            Expression::Ident(ident) => ident.load(env),
            Expression::Number(Number { value, .. }) => Code::from(vec![Instruction::LoadInt(*value)]),
            Expression::BinaryOp(BinaryOp { op, left, right }) => {
                let mut code = left.generate(env);
                code.append(right.generate(env));
                code.push(Instruction::Binary(*op));
                code
            }
            Expression::UnaryOp(unary) => unary.generate(env),
            Expression::Empty => Code::new(),
        }
    }
}

impl Ident {
    pub fn load(&self, env: &mut Environment) -> Code {
        Code::from(vec![Instruction::Load(env.slot(&self.name))])
    }

    /// Store the top of the stack into this variable
    pub fn store(&self, env: &mut Environment) -> Code {
        Code::from(vec![Instruction::Store(env.slot(&self.name))])
    }
}

impl UnaryOp {
    fn generate(&self, env: &mut Environment) -> Code {
        match self {
            UnaryOp::Not(operand) => {
                let mut code = operand.generate(env);
                code.push(Instruction::Not);
                code
            }
            // odd x  ==  x % 2 == 1
            UnaryOp::Odd(operand) => {
                let mut code = operand.generate(env);
                code.push(Instruction::LoadInt(2))
                    .push(Instruction::Binary(BinOpKind::Mod))
                    .push(Instruction::LoadInt(1))
                    .push(Instruction::Binary(BinOpKind::Eq));
                code
            }
            UnaryOp::Increment(target) => step(target, BinOpKind::Add, env),
            UnaryOp::Decrement(target) => step(target, BinOpKind::Sub, env),
        }
    }
}

/// `++x` / `--x`: x := x ± 1, then yield the new value of x
fn step(target: &Ident, op: BinOpKind, env: &mut Environment) -> Code {
    let mut code = target.load(env);
    code.push(Instruction::LoadInt(1))
        .push(Instruction::Binary(op));
    code.append(target.store(env));
    code.append(target.load(env));
    code
}
