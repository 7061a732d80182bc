use zpc::ast::Statement;
use zpc::error::{CompileError, DiagnosticKind};

fn count_statements(source: &str) -> usize {
    match zpc::parse(source).unwrap_or_else(|err| panic!("parsing failed:\n{err}")).body {
        Statement::Sequence(stmts) => stmts.len(),
        other => panic!("expected a sequence, got {other:?}"),
    }
}

#[test]
fn line_comment_ignored() {
    let source = "
        // This is a comment
        x := 42
    ";
    assert_eq!(count_statements(source), 1);
}

#[test]
fn line_comment_at_end_of_input() {
    assert_eq!(count_statements("write 1 // no newline after this"), 1);
}

#[test]
fn block_comment_ignored() {
    let source = "
        /* This is a
           multi-line comment; with write 1 inside */
        x := 42
    ";
    assert_eq!(count_statements(source), 1);
}

#[test]
fn comments_between_tokens() {
    assert_eq!(count_statements("x/**/:=/* a */1/**/+//c\n2"), 1);
    assert_eq!(count_statements("if/**/x/**/then/**/write 1/**/end"), 1);
}

#[test]
fn consecutive_comments() {
    assert_eq!(count_statements("/* a *//* b */ // c\n// d\n/**/ write 1"), 1);
}

#[test]
fn only_comments() {
    assert_eq!(count_statements("// nothing\n/* at all */"), 0);
}

#[test]
fn comment_does_not_split_keyword() {
    // `w/**/rite` is the identifier `w`, a comment, then the identifier `rite`
    assert!(zpc::compile("w/**/rite 1").is_err());
    assert!(zpc::compile("wh/**/ile 1 do end").is_err());
}

#[test]
fn comment_does_not_split_identifier() {
    assert!(zpc::compile("ab/**/c := 1").is_err());
}

#[test]
fn comment_does_not_split_number() {
    assert!(zpc::compile("x := 1/**/2").is_err());
}

#[test]
fn division_is_not_a_comment() {
    assert_eq!(zpc::compile("write 4 / 2").map(|code| code.contains("div i")), Ok(true));
}

#[test]
fn comment_markers_in_line_comment() {
    assert_eq!(count_statements("// /* not a block comment\nwrite 1"), 1);
}

#[test]
fn unterminated_block_comment_is_lexical_error() {
    let err = zpc::compile("x := 1;\n/* never closed").unwrap_err();
    let CompileError::Syntax(diagnostics) = &err else {
        panic!("expected a syntax error, got {err:?}");
    };
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Lexical);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 1));
    assert!(err.to_string().contains("unterminated block comment"));
}
