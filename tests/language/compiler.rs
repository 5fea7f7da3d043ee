//! Integration tests for the compiler
//!
//! Tests the public compile entry points and the shape of their output.

use scalc_foundation::CompileErrorKind;
use scalc_language::opcode::{TAG_NO_STRING, TAG_USES_STRING};
use scalc_language::{Opcode, Operand, compile, compile_bytes, compile_into, postfix_capacity};

fn ops(source: &str) -> Vec<Opcode> {
    compile(source)
        .unwrap()
        .instructions()
        .map(|i| i.unwrap().op)
        .collect()
}

// =============================================================================
// Output Shape
// =============================================================================

#[test]
fn output_starts_with_type_tag_and_ends_with_end() {
    let code = compile("A+1").unwrap();
    assert_eq!(code.as_bytes()[0], TAG_NO_STRING);
    assert_eq!(code.as_bytes().last(), Some(&Opcode::End.to_byte()));

    let code = compile("AA+'x'").unwrap();
    assert_eq!(code.as_bytes()[0], TAG_USES_STRING);
}

#[test]
fn compile_into_matches_compile() {
    let source = "A>B?PRINTF('%.2f',A):MAX(A,B,1.5)";
    let code = compile(source).unwrap();
    let mut buf = vec![0u8; postfix_capacity(source.len())];
    let len = compile_into(source.as_bytes(), &mut buf).unwrap();
    assert_eq!(&buf[..len], code.as_bytes());
}

#[test]
fn raw_bytes_end_at_nul() {
    let code = compile_bytes(b"A+1\0garbage").unwrap();
    assert_eq!(code, compile("A+1").unwrap());
}

#[test]
fn string_literal_payloads() {
    let code = compile("\"it's\"+'say \"hi\"'").unwrap();
    let payloads: Vec<_> = code
        .instructions()
        .map(|i| i.unwrap().operand)
        .filter_map(|o| match o {
            Operand::Str(s) => Some(s.to_vec()),
            _ => None,
        })
        .collect();
    assert_eq!(payloads, vec![b"it's".to_vec(), b"say \"hi\"".to_vec()]);
}

#[test]
fn record_style_expressions() {
    use Opcode::*;
    assert_eq!(
        ops("(A+B)/2"),
        vec![Fetch(0), Fetch(1), Add, LiteralInt, Div, End]
    );
    assert_eq!(
        ops("ABS(A-B)>C"),
        vec![Fetch(0), Fetch(1), Sub, Abs, Fetch(2), Greater, End]
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn errors_keep_legacy_status_codes() {
    let cases = [
        ("", 12),
        ("A+", 8),
        ("(A", 6),
        ("A)", 5),
        ("A?B", 7),
        ("1 2", 11),
    ];
    for (source, status) in cases {
        let err = compile(source).unwrap_err();
        assert_eq!(err.status(), status, "{source:?}");
    }
}

#[test]
fn errors_carry_the_expression() {
    let err = compile("SQRT(A").unwrap_err();
    assert_eq!(err.compile_kind(), Some(CompileErrorKind::ParenOpen));
    let ctx = err.context.unwrap();
    assert_eq!(ctx.expression.as_deref(), Some("SQRT(A"));
}
