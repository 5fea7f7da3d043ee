//! REPL, CLI, and session persistence for sCalc.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop with `:` commands
//! - [`Session`] - Register file and configuration an expression runs against
//! - Session serialization and deserialization (`MessagePack`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod repl;
pub mod serialize;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Response, render};
pub use serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
pub use session::{Register, Session};
