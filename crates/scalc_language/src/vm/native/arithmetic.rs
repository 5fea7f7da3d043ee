//! Binary operators for the VM.
//!
//! Operators that accept strings pick their flavor from the operand types:
//! a number on the left (or failing that, on the right) makes the operation
//! numeric, otherwise both strings are used as text.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use scalc_foundation::{Error, ErrorKind, EvalErrorKind, FixedString, Result, SMALL, Value};

use super::string;
use crate::opcode::Opcode;

/// Operands of a mixed binary operator after coercion.
enum Pair {
    Numbers(f64, f64),
    Texts(FixedString, FixedString),
}

fn pair(left: Value, right: Value) -> Pair {
    match (left, right) {
        (Value::Number(a), right) => Pair::Numbers(a, right.as_number()),
        (left, Value::Number(b)) => Pair::Numbers(left.as_number(), b),
        (Value::Text(a), Value::Text(b)) => Pair::Texts(a, b),
    }
}

fn truth(b: bool) -> Value {
    Value::Number(f64::from(u8::from(b)))
}

/// Numeric comparison with the `SMALL` tolerance.
fn compare_numbers(op: Opcode, a: f64, b: f64) -> bool {
    match op {
        Opcode::Equal => (a - b).abs() < SMALL,
        Opcode::NotEq => (a - b).abs() > SMALL,
        Opcode::Greater => a - b > SMALL,
        Opcode::GreaterEq => (a - b).abs() < SMALL || a > b,
        Opcode::Less => b - a > SMALL,
        _ => (a - b).abs() < SMALL || a < b,
    }
}

fn compare_texts(op: Opcode, a: &FixedString, b: &FixedString) -> bool {
    match op {
        Opcode::Equal => a == b,
        Opcode::NotEq => a != b,
        Opcode::Greater => a > b,
        Opcode::GreaterEq => a >= b,
        Opcode::Less => a < b,
        _ => a <= b,
    }
}

fn modulo(a: f64, b: f64, fast_path: bool) -> Result<f64> {
    if fast_path {
        let divisor = b as i32;
        if divisor == 0 {
            return Err(Error::eval(EvalErrorKind::ModuloByZero));
        }
        Ok(f64::from((a as i32).wrapping_rem(divisor)))
    } else {
        let divisor = b as i64;
        if divisor == 0 {
            return Err(Error::eval(EvalErrorKind::ModuloByZero));
        }
        Ok((a as i64).wrapping_rem(divisor) as f64)
    }
}

fn shift(left: Value, right: &Value, op: Opcode, fast_path: bool) -> Value {
    let count = right.as_number();
    let towards_right = op == Opcode::ShiftRight;
    match left {
        Value::Text(s) => Value::Text(string::shift(&s, count, towards_right)),
        Value::Number(a) if fast_path => {
            let (a, n) = (a as i64, count as i64 as u32);
            let shifted = if towards_right { a.wrapping_shr(n) } else { a.wrapping_shl(n) };
            Value::Number(shifted as f64)
        }
        Value::Number(a) => {
            let (a, n) = (a as i32, count as i32 as u32);
            let shifted = if towards_right { a.wrapping_shr(n) } else { a.wrapping_shl(n) };
            Value::Number(f64::from(shifted))
        }
    }
}

/// Applies the binary operator `op` to `left` and `right`.
///
/// `fast_path` selects the integer widths of numeric-only expressions.
///
/// # Errors
///
/// Fails on division or modulo by zero.
pub(crate) fn binary(op: Opcode, left: Value, right: Value, fast_path: bool) -> Result<Value> {
    match op {
        Opcode::Add => Ok(match pair(left, right) {
            Pair::Numbers(a, b) => Value::Number(a + b),
            Pair::Texts(a, b) => Value::Text(string::concat(a, &b)),
        }),
        Opcode::Sub | Opcode::SubLast => Ok(match pair(left, right) {
            Pair::Numbers(a, b) => Value::Number(a - b),
            Pair::Texts(a, b) => Value::Text(string::remove(a, &b, op == Opcode::SubLast)),
        }),
        Opcode::MaxVal | Opcode::MinVal => Ok(match pair(left, right) {
            Pair::Numbers(a, b) => {
                let take = if op == Opcode::MaxVal { a < b } else { a > b };
                Value::Number(if take { b } else { a })
            }
            Pair::Texts(a, b) => {
                let take = if op == Opcode::MaxVal { a < b } else { a > b };
                Value::Text(if take { b } else { a })
            }
        }),
        Opcode::Equal
        | Opcode::NotEq
        | Opcode::Greater
        | Opcode::GreaterEq
        | Opcode::Less
        | Opcode::LessEq => Ok(truth(match pair(left, right) {
            Pair::Numbers(a, b) => compare_numbers(op, a, b),
            Pair::Texts(a, b) => compare_texts(op, &a, &b),
        })),
        Opcode::ShiftRight | Opcode::ShiftLeft => Ok(shift(left, &right, op, fast_path)),
        _ => {
            let (a, b) = (left.as_number(), right.as_number());
            Ok(Value::Number(match op {
                Opcode::Mul => a * b,
                Opcode::Div => {
                    if b == 0.0 {
                        return Err(Error::eval(EvalErrorKind::DivisionByZero));
                    }
                    a / b
                }
                Opcode::Mod => modulo(a, b, fast_path)?,
                Opcode::Power => a.powf(b),
                Opcode::Atan2 => b.atan2(a),
                Opcode::RelOr => f64::from(u8::from(a != 0.0 || b != 0.0)),
                Opcode::RelAnd => f64::from(u8::from(a != 0.0 && b != 0.0)),
                Opcode::BitOr => ((a as i64) | (b as i64)) as f64,
                Opcode::BitAnd => ((a as i64) & (b as i64)) as f64,
                Opcode::BitXor => ((a as i64) ^ (b as i64)) as f64,
                _ => {
                    return Err(Error::new(ErrorKind::Internal(format!(
                        "{op} is not a binary operator"
                    ))));
                }
            }))
        }
    }
}
