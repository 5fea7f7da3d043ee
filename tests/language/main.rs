//! Integration tests for the language layer
//!
//! Tests for lexer, compiler, disassembler, and VM.

mod compiler;
mod disassembly;
mod lexer;
mod vm;
