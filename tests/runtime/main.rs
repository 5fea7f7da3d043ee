//! Integration tests for the runtime layer
//!
//! Tests for the REPL command set, session registers, and persistence.

mod repl;
mod session;
