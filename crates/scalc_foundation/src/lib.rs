//! Core values, fixed-capacity strings, errors, and configuration for sCalc.
//!
//! This crate provides:
//! - [`Value`] - The dual-typed (number or text) evaluation cell
//! - [`FixedString`] - A bounded, stack-allocated byte string
//! - [`Error`] - Compile-time and evaluation-time error taxonomy
//! - [`EvalConfig`] - Explicit evaluation knobs (loop budget, tracing, RNG seed)
//! - [`numeric`] - C-compatible number/text conversions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
pub mod numeric;
mod text;
mod value;

#[cfg(test)]
mod fuzz_tests;

pub use config::EvalConfig;
pub use error::{
    CompileErrorKind, Error, ErrorContext, ErrorKind, EvalErrorKind, Result, error_message,
};
pub use text::{FixedString, STRING_SIZE};
pub use value::Value;

/// Number of numeric argument slots (`A` through `P`).
pub const NUMERIC_ARGS: usize = 16;

/// Number of string argument slots (`AA` through `LL`).
pub const STRING_ARGS: usize = 12;

/// Depth of the evaluation stack.
pub const STACK_SIZE: usize = 30;

/// Tolerance used by the relational operators on numbers.
pub const SMALL: f64 = 1.0e-11;
