//! String builtins: concatenation, removal, shifting, subranges and
//! replacement.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use scalc_foundation::numeric::nint_index;
use scalc_foundation::{FixedString, STRING_SIZE, Value};

/// `+` on two strings.
#[must_use]
pub(crate) fn concat(mut left: FixedString, right: &FixedString) -> FixedString {
    left.push_bytes(right.as_bytes());
    left
}

/// `-` (first occurrence) and `|-` (last occurrence) on two strings.
///
/// An empty right operand leaves the left unchanged.
#[must_use]
pub(crate) fn remove(mut left: FixedString, right: &FixedString, last: bool) -> FixedString {
    if right.is_empty() {
        return left;
    }
    let at = if last { left.rfind(right.as_bytes()) } else { left.find(right.as_bytes()) };
    if let Some(at) = at {
        left.remove_range(at, right.len());
    }
    left
}

/// `>>` and `<<` on a string: moves characters right (padding with spaces)
/// or left (dropping leading characters) by `count` positions.
///
/// The count is clamped to the slot size; a negative count shifts the other
/// way.
#[must_use]
pub(crate) fn shift(text: &FixedString, count: f64, right: bool) -> FixedString {
    let count = nint_index(count).min(STRING_SIZE as i32);
    let (right, n) = if count < 0 { (!right, count.unsigned_abs() as usize) } else { (right, count as usize) };
    let n = n.min(STRING_SIZE);
    if right {
        let mut out = FixedString::new();
        (0..n).for_each(|_| out.push_bytes(b" "));
        out.push_bytes(text.as_bytes());
        out
    } else {
        FixedString::from_bytes(text.as_bytes().get(n..).unwrap_or_default())
    }
}

fn numeric_bound(value: f64, len: usize) -> i64 {
    let bound = value as i64;
    if bound < 0 { bound + len as i64 } else { bound }
}

/// `host[first, last]`: the inclusive substring between two bounds.
///
/// A numeric bound is a character index, counted from the end when
/// negative. A string `first` starts after its first match in the host (or at
/// 0); a string `last` ends just before its first match (or at the end).
#[must_use]
pub(crate) fn subrange(host: &FixedString, first: &Value, last: &Value) -> FixedString {
    let bytes = host.as_bytes();
    let len = bytes.len();
    let start = match first {
        Value::Number(d) => numeric_bound(*d, len),
        Value::Text(s) => host.find(s.as_bytes()).map_or(0, |at| (at + s.len()) as i64),
    };
    let end = match last {
        Value::Number(d) => numeric_bound(*d, len),
        Value::Text(s) if s.is_empty() => len as i64,
        Value::Text(s) => host.find(s.as_bytes()).map_or(len as i64, |at| at as i64 - 1),
    };
    let start = start.clamp(0, len as i64) as usize;
    let end = end.min(len as i64 - 1);
    if end < start as i64 {
        return FixedString::new();
    }
    FixedString::from_bytes(&bytes[start..=end as usize])
}

/// `host{old, new}`: replaces the first occurrence of `old` with `new`.
///
/// An empty `old` matches at the start.
#[must_use]
pub(crate) fn replace(host: &FixedString, old: &FixedString, new: &FixedString) -> FixedString {
    let Some(at) = host.find(old.as_bytes()) else {
        return *host;
    };
    let bytes = host.as_bytes();
    let mut out = FixedString::from_bytes(&bytes[..at]);
    out.push_bytes(new.as_bytes());
    out.push_bytes(&bytes[at + old.len()..]);
    out
}

/// `LEN`: length of the text view.
#[must_use]
pub(crate) fn len(value: &mut Value) -> f64 {
    value.coerce_text().len() as f64
}

/// `BYTE`: first byte of a string as a signed char; numbers pass through.
#[must_use]
pub(crate) fn byte(value: &Value) -> Value {
    match value {
        Value::Text(s) => Value::Number(f64::from(s.first().unwrap_or(0) as i8)),
        Value::Number(_) => *value,
    }
}
