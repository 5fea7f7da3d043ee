//! Integration tests for the foundation layer
//!
//! Tests for core types: Value, FixedString, numeric conversions, and Error.

mod errors;
mod properties;
mod text;
mod values;
