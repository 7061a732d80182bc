use zpc::codegen::{self, Environment, Instruction, Label, SemanticError};
use zpc::error::{CompileError, DiagnosticKind};
use zpc::span::Span;

fn compile(source: &str) -> String {
    zpc::compile(source).unwrap_or_else(|err| panic!("compile failed:\n{err}"))
}

fn lines(code: &str) -> Vec<&str> {
    code.lines().collect()
}

#[test]
fn codegen_write_expression() {
    assert_eq!(
        compile("write 1 + 1 * 2"),
        "ssp 0\nldc i 1\nldc i 1\nldc i 2\nmul i\nadd i\nout i\nldc c '\\n'\nout c\nhlt\n"
    );
}

#[test]
fn codegen_assignment_and_reassignment_share_a_slot() {
    assert_eq!(
        lines(&compile("x := 1; x := x + 1; write x")),
        [
            "ssp 1", "ldc i 1", "str i 0 0", "lod i 0 0", "ldc i 1", "add i", "str i 0 0",
            "lod i 0 0", "out i", "ldc c '\\n'", "out c", "hlt",
        ]
    );
}

#[test]
fn codegen_slots_in_first_use_order() {
    assert_eq!(
        lines(&compile("b := 1; a := 2; c := a + b")),
        [
            "ssp 3", "ldc i 1", "str i 0 0", "ldc i 2", "str i 0 1", "lod i 0 1", "lod i 0 0",
            "add i", "str i 0 2", "hlt",
        ]
    );
}

#[test]
fn codegen_assignment_target_numbered_before_value() {
    assert_eq!(
        lines(&compile("x := y")),
        ["ssp 2", "lod i 0 1", "str i 0 0", "hlt"]
    );
}

#[test]
fn codegen_read() {
    assert_eq!(lines(&compile("read x")), ["ssp 1", "in i", "str i 0 0", "hlt"]);
}

#[test]
fn codegen_empty_program() {
    assert_eq!(compile(""), "ssp 0\nhlt\n");
}

#[test]
fn codegen_binary_mnemonics() {
    let cases = [
        ("-", "sub i"),
        ("/", "div i"),
        ("%", "mod i"),
        (">", "grt i"),
        ("<", "les i"),
        (">=", "geq i"),
        ("<=", "leq i"),
        ("==", "equ i"),
        ("!=", "neq i"),
        ("and", "and"),
        ("or", "or"),
        ("xor", "xor"),
    ];
    for (op, mnemonic) in cases {
        let code = compile(&format!("write 7 {op} 2"));
        assert_eq!(lines(&code)[3], mnemonic, "operator {op}");
    }
}

#[test]
fn codegen_not_and_odd() {
    assert_eq!(
        lines(&compile("write not 0")),
        ["ssp 0", "ldc i 0", "not", "out i", "ldc c '\\n'", "out c", "hlt"]
    );
    assert_eq!(
        lines(&compile("write odd 3"))[1..6],
        ["ldc i 3", "ldc i 2", "mod i", "ldc i 1", "equ i"]
    );
}

#[test]
fn codegen_increment_writes_back_then_loads() {
    assert_eq!(
        lines(&compile("x := ++y")),
        [
            "ssp 2", "lod i 0 1", "ldc i 1", "add i", "str i 0 1", "lod i 0 1", "str i 0 0",
            "hlt",
        ]
    );
    assert_eq!(lines(&compile("x := --x"))[3], "sub i");
}

#[test]
fn codegen_if_else() {
    assert_eq!(
        lines(&compile("if 2 <= 1 then write 1 end")),
        [
            "ssp 0", "ldc i 2", "ldc i 1", "leq i", "fjp else0", "ldc i 1", "out i",
            "ldc c '\\n'", "out c", "ujp endif1", "else0:", "endif1:", "hlt",
        ]
    );
}

#[test]
fn codegen_while_loop() {
    assert_eq!(
        lines(&compile("while x < 3 do x := x + 1 end")),
        [
            "ssp 1", "loop2:", "lod i 0 0", "ldc i 3", "les i", "fjp endloop1", "lod i 0 0",
            "ldc i 1", "add i", "str i 0 0", "continue0:", "ujp loop2", "endloop1:", "hlt",
        ]
    );
}

#[test]
fn codegen_for_loop_update_follows_continue_label() {
    let code = compile("for i := 0; i < 2; i := i + 1 do continue end");
    let code = lines(&code);
    let continue_at = code.iter().position(|l| *l == "continue0:").unwrap();
    assert_eq!(code[continue_at - 1], "ujp continue0");
    assert_eq!(&code[continue_at + 1..continue_at + 5], ["lod i 0 0", "ldc i 1", "add i", "str i 0 0"]);
    assert_eq!(code[continue_at + 5], "ujp loop2");
}

#[test]
fn codegen_break_jumps_past_loop() {
    assert_eq!(
        lines(&compile("while 1 do break end")),
        [
            "ssp 0", "loop2:", "ldc i 1", "fjp endloop1", "ujp endloop1", "continue0:",
            "ujp loop2", "endloop1:", "hlt",
        ]
    );
}

#[test]
fn codegen_break_targets_innermost_loop() {
    let code = compile("while 1 do while 2 do break end; break end");
    let jumps: Vec<_> = lines(&code)
        .into_iter()
        .filter(|l| l.starts_with("ujp endloop"))
        .collect();
    // inner loop labels are allocated after the outer loop's
    assert_eq!(jumps, ["ujp endloop4", "ujp endloop1"]);
}

#[test]
fn codegen_case_keeps_stack_balanced() {
    assert_eq!(
        lines(&compile("match x of case 1 => write 10 end")),
        [
            "ssp 1", "lod i 0 0", "dpl i", "ldc i 1", "equ i", "fjp case1", "pop", "ldc i 10",
            "out i", "ldc c '\\n'", "out c", "ujp endcase0", "case1:", "pop", "endcase0:", "hlt",
        ]
    );
}

#[test]
fn codegen_exit_halts() {
    assert_eq!(lines(&compile("exit; write 1"))[..2], ["ssp 0", "hlt"]);
    assert_eq!(lines(&compile("exit; write 1")).last(), Some(&"hlt"));
}

#[test]
fn codegen_break_outside_loop_is_semantic_error() {
    let err = zpc::compile("x := 1;\n  break").unwrap_err();
    let CompileError::Semantic(diagnostic) = &err else {
        panic!("expected a semantic error, got {err:?}");
    };
    assert_eq!(diagnostic.kind, DiagnosticKind::Semantic);
    assert_eq!((diagnostic.line, diagnostic.column), (2, 3));
    assert!(err.to_string().contains("`break` outside of a loop"));
}

#[test]
fn codegen_continue_outside_loop_is_semantic_error() {
    let program = zpc::parse("if 1 then continue end").unwrap();
    assert_eq!(
        codegen::generate(&program),
        Err(SemanticError::ContinueOutsideLoop {
            span: Span::new(10, 18)
        })
    );
}

#[test]
fn codegen_loop_control_inside_case_inside_loop() {
    assert!(zpc::compile("while 1 do match 1 of case 1 => break end end").is_ok());
}

#[test]
fn codegen_environment_labels_are_unique() {
    let mut env = Environment::new();
    let a = env.fresh_label("loop");
    let b = env.fresh_label("loop");
    assert_ne!(a, b);
    assert_eq!(a, Label::new("loop", 0));
    assert_eq!(b.as_str(), "loop1");
}

#[test]
fn codegen_environment_loop_stack() {
    let mut env = Environment::new();
    assert!(env.innermost_loop().is_none());

    let outer = env.enter_loop();
    let inner = env.enter_loop();
    assert_eq!(env.loop_depth(), 2);
    assert_eq!(env.innermost_loop(), Some(&inner));

    env.leave_loop();
    assert_eq!(env.innermost_loop(), Some(&outer));
    env.leave_loop();
    assert_eq!(env.loop_depth(), 0);
}

#[test]
fn codegen_environment_slots() {
    let mut env = Environment::new();
    assert_eq!(env.slot("x"), 0);
    assert_eq!(env.slot("y"), 1);
    assert_eq!(env.slot("x"), 0);
    assert_eq!(env.lookup("z"), None);
    assert_eq!(env.allocated(), 2);
}

#[test]
fn codegen_instruction_text() {
    assert_eq!(Instruction::LoadChar('\n').to_string(), "ldc c '\\n'");
    assert_eq!(Instruction::LoadChar('a').to_string(), "ldc c 'a'");
    assert_eq!(Instruction::Store(3).to_string(), "str i 0 3");
    assert_eq!(Instruction::Define(Label::new("else", 7)).to_string(), "else7:");
    assert_eq!(Instruction::JumpIfFalse(Label::new("case", 2)).to_string(), "fjp case2");
}
