//! Unary math functions, vararg reductions, constants and random numbers.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use scalc_foundation::numeric::{hunt_number, round_half_away};
use scalc_foundation::{Error, ErrorKind, EvalErrorKind, FixedString, Result, Value};

use super::{checksum, escape, string};
use crate::opcode::Opcode;

/// Arc-seconds in a full degree times 180.
const ARC_SECONDS: f64 = 180.0 * 3600.0;

/// Returns the value of a constant opcode.
#[must_use]
pub(crate) fn constant(op: Opcode) -> Option<f64> {
    Some(match op {
        Opcode::ConstPi => PI,
        Opcode::ConstD2R => PI / 180.0,
        Opcode::ConstR2D => 180.0 / PI,
        Opcode::ConstS2R => PI / ARC_SECONDS,
        Opcode::ConstR2S => ARC_SECONDS / PI,
        _ => return None,
    })
}

/// Uniform random number in (0, 1].
pub(crate) fn uniform(rng: &mut ChaCha8Rng) -> f64 {
    1.0 - rng.r#gen::<f64>()
}

/// Standard normal random number (Box-Muller).
pub(crate) fn normal(rng: &mut ChaCha8Rng) -> f64 {
    let radius = (-2.0 * uniform(rng).ln()).sqrt();
    radius * (2.0 * PI * uniform(rng)).cos()
}

fn domain(op: &'static str) -> Error {
    Error::eval(EvalErrorKind::Domain { op })
}

fn non_negative(value: f64, op: &'static str) -> Result<f64> {
    if value < 0.0 { Err(domain(op)) } else { Ok(value) }
}

/// Applies the unary operator `op` to the top-of-stack cell in place.
///
/// # Errors
///
/// Fails for `SQRT`, `LOG` and `LN` of a negative number.
pub(crate) fn unary(op: Opcode, cell: &mut Value, fast_path: bool) -> Result<()> {
    match op {
        Opcode::ToString => {
            cell.coerce_text();
            return Ok(());
        }
        Opcode::Len => {
            *cell = Value::Number(string::len(cell));
            return Ok(());
        }
        Opcode::Byte => {
            *cell = string::byte(cell);
            return Ok(());
        }
        Opcode::TrEsc => {
            escape::translate_op(cell);
            return Ok(());
        }
        Opcode::Esc => {
            escape::escape_op(cell);
            return Ok(());
        }
        Opcode::Crc16 | Opcode::Modbus => {
            checksum::crc16_op(cell, op == Opcode::Modbus);
            return Ok(());
        }
        Opcode::Lrc | Opcode::AModbus => {
            checksum::lrc_op(cell, op == Opcode::AModbus);
            return Ok(());
        }
        Opcode::Xor8 | Opcode::AddXor8 => {
            checksum::xor8_op(cell, op == Opcode::AddXor8);
            return Ok(());
        }
        Opcode::Nint | Opcode::ToDouble => {
            let value = match cell {
                Value::Text(s) => hunt_number(s.as_bytes()),
                Value::Number(d) => *d,
            };
            *cell = Value::Number(if op == Opcode::Nint { round_half_away(value) } else { value });
            return Ok(());
        }
        _ => {}
    }

    let d = cell.as_number();
    let result = match op {
        Opcode::Neg => -d,
        Opcode::Abs => d.abs(),
        Opcode::Sqrt => non_negative(d, "SQRT")?.sqrt(),
        Opcode::Exp => d.exp(),
        Opcode::Log10 => non_negative(d, "LOG")?.log10(),
        Opcode::LogE => non_negative(d, "LN")?.ln(),
        Opcode::Acos => d.acos(),
        Opcode::Asin => d.asin(),
        Opcode::Atan => d.atan(),
        Opcode::Cos => d.cos(),
        Opcode::Cosh => d.cosh(),
        Opcode::Sin => d.sin(),
        Opcode::Sinh => d.sinh(),
        Opcode::Tan => d.tan(),
        Opcode::Tanh => d.tanh(),
        Opcode::Ceil => d.ceil(),
        Opcode::Floor => d.floor(),
        Opcode::IsInf => f64::from(u8::from(d.is_infinite())),
        Opcode::RelNot => f64::from(u8::from(d == 0.0)),
        Opcode::BitNot if fast_path => !(d as i64) as f64,
        Opcode::BitNot => f64::from(!(d as i32)),
        _ => {
            return Err(Error::new(ErrorKind::Internal(format!(
                "{op} is not a unary operator"
            ))));
        }
    };
    *cell = Value::Number(result);
    Ok(())
}

fn max_by_number(values: &[Value], max: bool) -> f64 {
    values
        .iter()
        .map(Value::as_number)
        .reduce(|best, d| {
            let better = if max { d > best } else { d < best };
            if best.is_nan() || better { d } else { best }
        })
        .unwrap_or(0.0)
}

fn max_by_text(values: &[Value], max: bool) -> FixedString {
    values
        .iter()
        .map(Value::as_text)
        .reduce(|best, s| {
            let better = if max { s > best } else { s < best };
            if better { s } else { best }
        })
        .unwrap_or_default()
}

/// Reduces the operands of a vararg function to one value.
///
/// `MAX`/`MIN` compare numerically when any operand is a number, with NaN
/// losing to every comparable value; otherwise they compare text.
#[must_use]
pub(crate) fn reduce(op: Opcode, values: &[Value]) -> Value {
    match op {
        Opcode::Finite => {
            Value::Number(f64::from(u8::from(values.iter().all(|v| v.as_number().is_finite()))))
        }
        Opcode::IsNan => {
            Value::Number(f64::from(u8::from(values.iter().any(|v| v.as_number().is_nan()))))
        }
        _ => {
            let max = op == Opcode::Max;
            if values.iter().any(Value::is_number) {
                Value::Number(max_by_number(values, max))
            } else {
                Value::Text(max_by_text(values, max))
            }
        }
    }
}
