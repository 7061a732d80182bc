//! The instruction set of the target stack machine and its text form

use std::fmt;

use crate::ast::BinOpKind;

/// A jump target. Label text is unique within one compile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(category: &str, id: usize) -> Self {
        Label(format!("{category}{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of output: an instruction or a label definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `ssp n`: reserve `n` variable slots
    Ssp(usize),
    /// `lod i 0 slot`
    Load(usize),
    /// `str i 0 slot`
    Store(usize),
    /// `ldc i value`
    LoadInt(i32),
    /// `ldc c 'c'`
    LoadChar(char),
    /// `in i`
    Input,
    /// `out i`
    OutputInt,
    /// `out c`
    OutputChar,
    Binary(BinOpKind),
    Not,
    /// `dpl i`
    Duplicate,
    Pop,
    /// `ujp label`
    Jump(Label),
    /// `fjp label`: pop, jump if false
    JumpIfFalse(Label),
    /// `label:`
    Define(Label),
    Halt,
}

impl Instruction {
    /// Mnemonic of a binary operator. Arithmetic and comparisons are typed
    /// (`i` suffix), the boolean operators are not.
    fn binary_mnemonic(op: BinOpKind) -> &'static str {
        match op {
            BinOpKind::Add => "add i",
            BinOpKind::Sub => "sub i",
            BinOpKind::Mul => "mul i",
            BinOpKind::Div => "div i",
            BinOpKind::Mod => "mod i",
            BinOpKind::Gt => "grt i",
            BinOpKind::Lt => "les i",
            BinOpKind::GtEq => "geq i",
            BinOpKind::LtEq => "leq i",
            BinOpKind::Eq => "equ i",
            BinOpKind::NotEq => "neq i",
            BinOpKind::And => "and",
            BinOpKind::Or => "or",
            BinOpKind::Xor => "xor",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Ssp(slots) => write!(f, "ssp {slots}"),
            Instruction::Load(slot) => write!(f, "lod i 0 {slot}"),
            Instruction::Store(slot) => write!(f, "str i 0 {slot}"),
            Instruction::LoadInt(value) => write!(f, "ldc i {value}"),
            Instruction::LoadChar(c) => write!(f, "ldc c '{}'", c.escape_default()),
            Instruction::Input => f.write_str("in i"),
            Instruction::OutputInt => f.write_str("out i"),
            Instruction::OutputChar => f.write_str("out c"),
            Instruction::Binary(op) => f.write_str(Instruction::binary_mnemonic(*op)),
            Instruction::Not => f.write_str("not"),
            Instruction::Duplicate => f.write_str("dpl i"),
            Instruction::Pop => f.write_str("pop"),
            Instruction::Jump(label) => write!(f, "ujp {label}"),
            Instruction::JumpIfFalse(label) => write!(f, "fjp {label}"),
            Instruction::Define(label) => write!(f, "{label}:"),
            Instruction::Halt => f.write_str("hlt"),
        }
    }
}

/// An ordered run of instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    instructions: Vec<Instruction>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn append(&mut self, mut other: Code) -> &mut Self {
        self.instructions.append(&mut other.instructions);
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl From<Vec<Instruction>> for Code {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl fmt::Display for Code {
    /// One instruction per line, each line newline-terminated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}
