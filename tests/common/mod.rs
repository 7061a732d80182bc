//! A reference emulator of the target stack machine, for checking what
//! compiled programs print

#![allow(dead_code)]

use std::collections::HashMap;

const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    StackUnderflow(usize),
    UnknownLabel(String),
    UnknownInstruction(String),
    BadSlot(usize),
    DivisionByZero(usize),
    InputExhausted,
    StepLimit,
    FellOffEnd,
}

/// Everything the machine printed, plus the final operand stack depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub output: String,
    pub stack_depth: usize,
}

impl Run {
    /// Printed integers, one per `write`
    pub fn lines(&self) -> Vec<String> {
        self.output.lines().map(str::to_string).collect()
    }
}

fn pop(stack: &mut Vec<i64>, pc: usize) -> Result<i64, Trap> {
    stack.pop().ok_or(Trap::StackUnderflow(pc))
}

fn slot(operand: &str, slots: &[i64], pc: usize) -> Result<usize, Trap> {
    let slot: usize = operand
        .parse()
        .map_err(|_| Trap::UnknownInstruction(operand.to_string()))?;
    if slot < slots.len() { Ok(slot) } else { Err(Trap::BadSlot(pc)) }
}

fn char_literal(text: &str) -> Option<char> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    match inner {
        "\\n" => Some('\n'),
        "\\t" => Some('\t'),
        "\\'" => Some('\''),
        "\\\\" => Some('\\'),
        _ => inner.chars().next(),
    }
}

/// Execute instruction text, feeding `input` to `in i`
pub fn execute(code: &str, input: &[i32]) -> Result<Run, Trap> {
    let lines: Vec<&str> = code.lines().collect();
    let labels: HashMap<&str, usize> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.strip_suffix(':').map(|name| (name, i)))
        .collect();
    let target = |name: &str| {
        labels
            .get(name)
            .copied()
            .ok_or_else(|| Trap::UnknownLabel(name.to_string()))
    };

    let mut stack: Vec<i64> = vec![];
    let mut slots: Vec<i64> = vec![];
    let mut input = input.iter();
    let mut output = String::new();
    let mut pc = 0;

    for _ in 0..STEP_LIMIT {
        let Some(line) = lines.get(pc) else {
            return Err(Trap::FellOffEnd);
        };
        pc += 1;
        if line.ends_with(':') {
            continue;
        }

        let parts: Vec<&str> = line.splitn(2, ' ').collect();
        let (opcode, rest) = (parts[0], parts.get(1).copied().unwrap_or(""));
        let here = pc - 1;

        match (opcode, rest) {
            ("ssp", n) => {
                let n: usize = n.parse().map_err(|_| Trap::UnknownInstruction(line.to_string()))?;
                slots = vec![0; n];
            }
            ("lod", operands) => {
                let slot = slot(operands.trim_start_matches("i 0 "), &slots, here)?;
                stack.push(slots[slot]);
            }
            ("str", operands) => {
                let slot = slot(operands.trim_start_matches("i 0 "), &slots, here)?;
                slots[slot] = pop(&mut stack, here)?;
            }
            ("ldc", operands) => {
                if let Some(value) = operands.strip_prefix("i ") {
                    let value: i64 = value
                        .parse()
                        .map_err(|_| Trap::UnknownInstruction(line.to_string()))?;
                    stack.push(value);
                } else {
                    let c = operands
                        .strip_prefix("c ")
                        .and_then(char_literal)
                        .ok_or_else(|| Trap::UnknownInstruction(line.to_string()))?;
                    stack.push(c as i64);
                }
            }
            ("in", "i") => {
                let value = input.next().ok_or(Trap::InputExhausted)?;
                stack.push(*value as i64);
            }
            ("out", "i") => {
                let value = pop(&mut stack, here)?;
                output.push_str(&(value as i32).to_string());
            }
            ("out", "c") => {
                let value = pop(&mut stack, here)?;
                output.push(char::from_u32(value as u32).unwrap_or('?'));
            }
            ("not", "") => {
                let value = pop(&mut stack, here)?;
                stack.push((value == 0) as i64);
            }
            ("dpl", "i") => {
                let value = pop(&mut stack, here)?;
                stack.push(value);
                stack.push(value);
            }
            ("pop", "") => {
                pop(&mut stack, here)?;
            }
            ("ujp", label) => pc = target(label)?,
            ("fjp", label) => {
                if pop(&mut stack, here)? == 0 {
                    pc = target(label)?;
                }
            }
            ("hlt", "") => {
                return Ok(Run {
                    output,
                    stack_depth: stack.len(),
                });
            }
            (binary, _) => {
                let right = pop(&mut stack, here)?;
                let left = pop(&mut stack, here)?;
                let result = match binary {
                    "add" => (left as i32).wrapping_add(right as i32) as i64,
                    "sub" => (left as i32).wrapping_sub(right as i32) as i64,
                    "mul" => (left as i32).wrapping_mul(right as i32) as i64,
                    "div" | "mod" if right == 0 => return Err(Trap::DivisionByZero(here)),
                    "div" => (left as i32).wrapping_div(right as i32) as i64,
                    "mod" => (left as i32).wrapping_rem(right as i32) as i64,
                    "grt" => (left > right) as i64,
                    "les" => (left < right) as i64,
                    "geq" => (left >= right) as i64,
                    "leq" => (left <= right) as i64,
                    "equ" => (left == right) as i64,
                    "neq" => (left != right) as i64,
                    "and" => (left != 0 && right != 0) as i64,
                    "or" => (left != 0 || right != 0) as i64,
                    "xor" => ((left != 0) != (right != 0)) as i64,
                    _ => return Err(Trap::UnknownInstruction(line.to_string())),
                };
                stack.push(result);
            }
        }
    }

    Err(Trap::StepLimit)
}

/// Compile and run `source`, returning the printed lines
pub fn run(source: &str) -> Vec<String> {
    run_with_input(source, &[])
}

pub fn run_with_input(source: &str, input: &[i32]) -> Vec<String> {
    let code = zpc::compile(source).unwrap_or_else(|err| panic!("failed to compile:\n{err}"));
    execute(&code, input)
        .unwrap_or_else(|trap| panic!("machine trapped: {trap:?}\n{code}"))
        .lines()
}
