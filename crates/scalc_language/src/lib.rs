//! Lexer, compiler, disassembler, and bytecode VM for sCalc expressions.
//!
//! This crate provides:
//! - [`Lexer`] - Longest-match tokenization against the element tables
//! - [`compile`] - Shunting-Yard translation of infix text to postfix bytecode
//! - [`Bytecode`] - The compiled buffer and its instruction decoder
//! - [`pretty`] - Disassembly listings
//! - [`Vm`] - Stack-based interpreter over numbers and bounded strings
//!
//! # Example
//!
//! ```
//! use scalc_language::{Operands, Vm, compile};
//!
//! let code = compile("A*2+B").unwrap();
//! let mut numbers = [3.0, 1.0];
//! let mut registers = Operands::new(&mut numbers, &mut []);
//! let out = Vm::new().evaluate(&code, &mut registers).unwrap();
//! assert_eq!(out.number, 7.0);
//! assert_eq!(out.text, "7");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compiler;
pub mod lexer;
pub mod opcode;
pub mod pretty;
pub mod token;
pub mod vm;


pub use compiler::{OPERATOR_STACK_SIZE, compile, compile_bytes, compile_into, postfix_capacity};
pub use lexer::Lexer;
pub use opcode::{Bytecode, Instruction, Instructions, Opcode, Operand, decode};
pub use pretty::{disassemble, disassemble_compact};
pub use vm::{MAX_LOOPS, Operands, Outcome, Registers, Vm, VmStats, eval};
