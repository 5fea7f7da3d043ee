//! Native builtin implementations for the VM.
//!
//! Builtins are organized by category:
//! - `arithmetic`: binary operators, comparisons and bit operations
//! - `math`: unary functions, vararg reductions, constants, random numbers
//! - `string`: concatenation, removal, shifting, subrange and replace
//! - `format`: `PRINTF` and binary `WRITE`
//! - `scan`: `SSCANF` and binary `READ`
//! - `escape`: C escape translation in both directions
//! - `checksum`: CRC-16/MODBUS, LRC and XOR8

mod arithmetic;
mod checksum;
mod escape;
mod format;
#[allow(clippy::unnecessary_wraps)]
#[allow(clippy::match_same_arms)]
mod math;
mod scan;
mod string;

pub(crate) use arithmetic::binary;
pub(crate) use format::{bin_write, printf};
pub(crate) use math::{constant, normal, reduce, unary, uniform};
pub(crate) use scan::{bin_read, sscanf};
pub(crate) use string::{replace, subrange};

use scalc_foundation::STRING_SIZE;
use scalc_foundation::numeric::ScratchBuf;

/// Longest result of the formatting and escaping builtins.
pub(crate) const FORMAT_LIMIT: usize = STRING_SIZE - 2;

/// Working buffer for builtins whose intermediate text can outgrow a slot.
pub(crate) type Scratch = ScratchBuf<256>;
