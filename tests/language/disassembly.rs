//! Integration tests for the disassembler
//!
//! Tests listings of compiled expressions and custom listing formatters.

use scalc_foundation::Error;
use scalc_language::pretty::{Disassembler, ListingFormatter};
use scalc_language::{Instruction, compile, disassemble, disassemble_compact};

#[test]
fn compact_listing_reads_as_postfix() {
    let code = compile("(A+B)*2").unwrap();
    assert_eq!(disassemble_compact(&code), "FETCH_A FETCH_B ADD 2 MULT");
}

#[test]
fn listing_has_one_line_per_instruction() {
    let code = compile("A:=A+1;A").unwrap();
    let listing = disassemble(&code);
    let count = code.instructions().count();
    assert_eq!(listing.lines().count(), count + 1);
    assert!(listing.lines().last().unwrap().ends_with("END (0)"));
}

#[test]
fn display_is_the_human_listing() {
    let code = compile("LEN(AA)").unwrap();
    assert_eq!(code.to_string(), disassemble(&code));
}

/// Counts instructions and records malformed buffers.
#[derive(Default)]
struct Counting {
    instructions: usize,
    failed: bool,
}

impl ListingFormatter for Counting {
    fn header(&mut self, out: &mut String, uses_string: bool) {
        out.push_str(if uses_string { "S" } else { "N" });
    }

    fn instruction(&mut self, out: &mut String, _inst: &Instruction<'_>) {
        self.instructions += 1;
        out.push('.');
    }

    fn malformed(&mut self, out: &mut String, _error: &Error) {
        self.failed = true;
        out.push('!');
    }
}

#[test]
fn custom_formatter_sees_every_instruction() {
    let code = compile("MAX(A,B,C)").unwrap();
    let mut dis = Disassembler::new(Counting::default());
    assert_eq!(dis.listing(&code), "N.....");
}

#[test]
fn custom_formatter_sees_malformed_tail() {
    let code = scalc_language::Bytecode::from_bytes(vec![0xFE, 0xF0]);
    let mut dis = Disassembler::new(Counting::default());
    assert_eq!(dis.listing(&code), "N!");
}
