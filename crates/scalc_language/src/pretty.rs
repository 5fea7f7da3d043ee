//! Disassembler for compiled expressions.
//!
//! Turns a [`Bytecode`] buffer back into a readable instruction listing.
//! The layout is pluggable through [`ListingFormatter`]: the default
//! [`HumanFormatter`] prints one instruction per line, [`CompactFormatter`]
//! puts the whole expression on one line.
//!
//! # Example
//!
//! ```
//! use scalc_language::{compile, pretty::disassemble_compact};
//!
//! let code = compile("A+2").unwrap();
//! assert_eq!(disassemble_compact(&code), "FETCH_A 2 ADD");
//! ```

use std::fmt::{self, Write};

use scalc_foundation::Error;
use scalc_foundation::numeric::write_general;

use crate::opcode::{Bytecode, Instruction, Operand};

/// Renders the pieces of a listing.
pub trait ListingFormatter {
    /// Called once before any instruction.
    fn header(&mut self, out: &mut String, uses_string: bool);

    /// Called for every decoded instruction, `END` included.
    fn instruction(&mut self, out: &mut String, inst: &Instruction<'_>);

    /// Called if the buffer stops decoding.
    fn malformed(&mut self, out: &mut String, error: &Error);
}

/// Writes `value` like C `%g`.
fn push_number(out: &mut String, value: f64) {
    let _ = write_general(out, value, 6, false, false);
}

fn push_text(out: &mut String, bytes: &[u8]) {
    out.push('"');
    out.push_str(&String::from_utf8_lossy(bytes));
    out.push('"');
}

// =============================================================================
// Formatters
// =============================================================================

/// One instruction per line, prefixed with its offset.
///
/// ```text
/// ; numeric expression
///    1  Integer 2
///    6  FETCH_A (6)
///    7  MAX, 2 args
///    9  END (0)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanFormatter;

impl ListingFormatter for HumanFormatter {
    fn header(&mut self, out: &mut String, uses_string: bool) {
        out.push_str(if uses_string {
            "; string expression\n"
        } else {
            "; numeric expression\n"
        });
    }

    fn instruction(&mut self, out: &mut String, inst: &Instruction<'_>) {
        let _ = write!(out, "{:4}  ", inst.offset);
        match inst.operand {
            Operand::Double(d) => {
                out.push_str("Double ");
                push_number(out, d);
            }
            Operand::Int(i) => {
                let _ = write!(out, "Integer {i}");
            }
            Operand::Str(bytes) => {
                out.push_str("String ");
                push_text(out, bytes);
            }
            Operand::ArgCount(n) => {
                let _ = write!(out, "{}, {n} arg{}", inst.op, if n == 1 { "" } else { "s" });
            }
            Operand::None => {
                let _ = write!(out, "{} ({})", inst.op, inst.op.to_byte());
            }
        }
        out.push('\n');
    }

    fn malformed(&mut self, out: &mut String, error: &Error) {
        let _ = writeln!(out, "; {error}");
    }
}

/// The whole expression on one line, literals shown by value.
///
/// `END` is left out; vararg functions show their count as `MAX/3`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactFormatter {
    started: bool,
}

impl ListingFormatter for CompactFormatter {
    fn header(&mut self, _out: &mut String, _uses_string: bool) {
        self.started = false;
    }

    fn instruction(&mut self, out: &mut String, inst: &Instruction<'_>) {
        if inst.op == crate::opcode::Opcode::End {
            return;
        }
        if self.started {
            out.push(' ');
        }
        self.started = true;
        match inst.operand {
            Operand::Double(d) => push_number(out, d),
            Operand::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Operand::Str(bytes) => push_text(out, bytes),
            Operand::ArgCount(n) => {
                let _ = write!(out, "{}/{n}", inst.op);
            }
            Operand::None => {
                let _ = write!(out, "{}", inst.op);
            }
        }
    }

    fn malformed(&mut self, out: &mut String, _error: &Error) {
        if self.started {
            out.push(' ');
        }
        out.push_str("<malformed>");
    }
}

// =============================================================================
// Disassembler
// =============================================================================

/// Walks a buffer and feeds its instructions to a formatter.
#[derive(Debug, Default)]
pub struct Disassembler<F: ListingFormatter = HumanFormatter> {
    formatter: F,
}

impl<F: ListingFormatter> Disassembler<F> {
    /// Creates a disassembler using `formatter`.
    pub fn new(formatter: F) -> Self {
        Self { formatter }
    }

    /// Produces the listing of `code`.
    pub fn listing(&mut self, code: &Bytecode) -> String {
        let mut out = String::new();
        self.formatter.header(&mut out, code.uses_string());
        for inst in code.instructions() {
            match inst {
                Ok(inst) => self.formatter.instruction(&mut out, &inst),
                Err(e) => {
                    self.formatter.malformed(&mut out, &e);
                    break;
                }
            }
        }
        out
    }
}

/// Disassembles `code` one instruction per line.
#[must_use]
pub fn disassemble(code: &Bytecode) -> String {
    Disassembler::new(HumanFormatter).listing(code)
}

/// Disassembles `code` onto a single line.
#[must_use]
pub fn disassemble_compact(code: &Bytecode) -> String {
    Disassembler::new(CompactFormatter::default()).listing(code)
}

impl fmt::Display for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&disassemble(self))
    }
}
