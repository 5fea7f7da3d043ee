//! sCalc - String-capable expression compiler and bytecode evaluator
//!
//! This crate re-exports all layers of the sCalc system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: scalc_runtime    - REPL, CLI, session persistence
//! Layer 1: scalc_language   - Lexer, compiler, disassembler, bytecode VM
//! Layer 0: scalc_foundation - Core types (Value, FixedString, Error, EvalConfig)
//! ```

pub use scalc_foundation as foundation;
pub use scalc_language as language;
pub use scalc_runtime as runtime;
