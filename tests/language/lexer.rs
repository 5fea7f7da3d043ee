//! Integration tests for the lexer
//!
//! Tests longest-match lookup against the operand and operator tables.

use scalc_language::Lexer;
use scalc_language::token::ElementKind;

/// Alternates tables the way the compiler does and collects element names.
fn names(source: &str) -> Vec<&'static str> {
    let mut lexer = Lexer::new(source.as_bytes());
    let mut operand_expected = true;
    let mut out = Vec::new();
    while let Some((element, start)) = lexer.next_element(operand_expected) {
        out.push(element.name);
        match element.kind {
            ElementKind::LiteralOperand => {
                lexer.scan_number(start);
                operand_expected = false;
            }
            ElementKind::StringOperand => {
                lexer.scan_string(source.as_bytes()[start]);
                operand_expected = false;
            }
            ElementKind::Operand | ElementKind::CloseParen => operand_expected = false,
            _ => operand_expected = true,
        }
    }
    out
}

#[test]
fn longest_match_wins() {
    assert_eq!(names("AA+A"), vec!["AA", "+", "A"]);
    assert_eq!(names("A**B"), vec!["A", "**", "B"]);
    assert_eq!(names("A>=B"), vec!["A", ">=", "B"]);
}

#[test]
fn names_are_case_insensitive() {
    assert_eq!(names("sqrt(a)"), vec!["SQRT", "(", "A", ")"]);
}

#[test]
fn literals_are_rescanned() {
    assert_eq!(names("12.5*'x'"), vec!["1", "*", "'"]);
}

#[test]
fn input_ends_at_nul() {
    let mut lexer = Lexer::new(b"A\0+B");
    assert!(lexer.next_element(true).is_some());
    assert!(lexer.at_end());
}

#[test]
fn unknown_names_stop_the_lexer() {
    let mut lexer = Lexer::new(b"  ZZ");
    assert!(lexer.next_element(true).is_none());
    assert_eq!(lexer.position(), 2);
}
