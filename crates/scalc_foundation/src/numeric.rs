//! C-compatible conversions between numbers and text.
//!
//! String cells become numbers by parsing their longest numeric prefix
//! (the way `strtod`/`atof` do), and numbers become text through a `%g`
//! style formatter. All formatting goes through [`ScratchBuf`], a
//! stack-allocated `fmt::Write` sink, so conversions never touch the heap.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::fmt::{self, Write};

use crate::text::FixedString;

/// Significant digits used when a number is converted to text.
pub const TEXT_PRECISION: usize = 8;

/// A fixed-size `fmt::Write` sink. Output past capacity is dropped.
pub struct ScratchBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> ScratchBuf<N> {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends raw bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
    }

    /// Appends one byte.
    pub fn push(&mut self, byte: u8) {
        self.push_bytes(&[byte]);
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for ScratchBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for ScratchBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

// =============================================================================
// Text -> Number
// =============================================================================

/// Parses the longest numeric prefix of `bytes`, like C `strtod` without the
/// leading-whitespace skip.
///
/// Accepts an optional sign, decimal mantissas with optional exponent, `0x`
/// hexadecimal integers, and `inf`/`infinity`/`nan` in any case. Returns the
/// value and the number of bytes consumed, or `None` if no number starts here.
#[must_use]
pub fn parse_prefix(bytes: &[u8]) -> Option<(f64, usize)> {
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };
    let rest = &bytes[pos..];
    let sign = if negative { -1.0 } else { 1.0 };

    if let Some(len) = match_word(rest, "infinity").or_else(|| match_word(rest, "inf")) {
        return Some((sign * f64::INFINITY, pos + len));
    }
    if let Some(len) = match_word(rest, "nan") {
        return Some((f64::NAN, pos + len));
    }

    if rest.len() > 2 && rest[0] == b'0' && matches!(rest[1], b'x' | b'X') {
        let digits = rest[2..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
        if digits > 0 {
            let value = rest[2..2 + digits].iter().fold(0.0_f64, |acc, &b| {
                acc * 16.0 + f64::from(hex_value(b).unwrap_or(0))
            });
            return Some((sign * value, pos + 2 + digits));
        }
    }

    let int_digits = count_digits(rest);
    let mut len = int_digits;
    let mut frac_digits = 0;
    if rest.get(len) == Some(&b'.') {
        frac_digits = count_digits(&rest[len + 1..]);
        len += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(rest.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(rest.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&rest[exp..]);
        if exp_digits > 0 {
            len = exp + exp_digits;
        }
    }

    let text = std::str::from_utf8(&rest[..len]).ok()?;
    let value: f64 = text.parse().ok()?;
    Some((sign * value, pos + len))
}

/// Parses a number the way C `atof` does: leading whitespace is skipped and
/// anything that is not a number yields 0.
#[must_use]
pub fn atof(bytes: &[u8]) -> f64 {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    parse_prefix(&bytes[start..]).map_or(0.0, |(value, _)| value)
}

/// Hunts for the first numeral embedded anywhere in `bytes`.
///
/// The number starts at the first digit, extended left over a directly
/// preceding `.` and then a `-`. Text without digits yields 0.
#[must_use]
pub fn hunt_number(bytes: &[u8]) -> f64 {
    let Some(mut start) = bytes.iter().position(u8::is_ascii_digit) else {
        return 0.0;
    };
    if start > 0 && bytes[start - 1] == b'.' {
        start -= 1;
    }
    if start > 0 && bytes[start - 1] == b'-' {
        start -= 1;
    }
    atof(&bytes[start..])
}

/// Rounds half away from zero, keeping the result as a float.
#[must_use]
pub fn round_half_away(value: f64) -> f64 {
    if value >= 0.0 {
        (value + 0.5).trunc()
    } else {
        (value - 0.5).trunc()
    }
}

/// Rounds half away from zero to an `i32` array index.
#[must_use]
pub fn nint_index(value: f64) -> i32 {
    round_half_away(value) as i32
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn match_word(bytes: &[u8], word: &str) -> Option<usize> {
    let n = word.len();
    (bytes.len() >= n && bytes[..n].eq_ignore_ascii_case(word.as_bytes())).then_some(n)
}

/// Returns the value of an ASCII hex digit.
#[must_use]
pub fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// =============================================================================
// Number -> Text
// =============================================================================

/// Writes `value` as C `%.<precision>f` would.
///
/// # Errors
///
/// Propagates errors from the sink.
pub fn write_fixed<W: Write>(out: &mut W, value: f64, precision: usize, upper: bool) -> fmt::Result {
    if !value.is_finite() {
        return write_non_finite(out, value, upper);
    }
    write!(out, "{value:.precision$}")
}

/// Writes `value` as C `%.<precision>e` would (exponent with sign and at
/// least two digits).
///
/// # Errors
///
/// Propagates errors from the sink.
pub fn write_exp<W: Write>(out: &mut W, value: f64, precision: usize, upper: bool) -> fmt::Result {
    if !value.is_finite() {
        return write_non_finite(out, value, upper);
    }
    let mut tmp = ScratchBuf::<64>::new();
    write!(tmp, "{value:.precision$e}")?;
    let (mantissa, exponent) = split_exponent(tmp.as_bytes());
    out.write_str(as_str(mantissa))?;
    write!(out, "{}{exponent:+03}", if upper { 'E' } else { 'e' })
}

/// Writes `value` as C `%.<precision>g` would. With `alt` (the `#` flag)
/// trailing zeros are kept.
///
/// # Errors
///
/// Propagates errors from the sink.
pub fn write_general<W: Write>(
    out: &mut W,
    value: f64,
    precision: usize,
    alt: bool,
    upper: bool,
) -> fmt::Result {
    if !value.is_finite() {
        return write_non_finite(out, value, upper);
    }
    let precision = precision.max(1);
    let exponent = if value == 0.0 {
        0
    } else {
        let mut tmp = ScratchBuf::<64>::new();
        write!(tmp, "{:.*e}", precision - 1, value)?;
        split_exponent(tmp.as_bytes()).1
    };

    let mut body = ScratchBuf::<512>::new();
    if exponent < -4 || exponent >= precision as i32 {
        write!(body, "{:.*e}", precision - 1, value)?;
        let (mantissa, exponent) = split_exponent(body.as_bytes());
        let mantissa = if alt { mantissa } else { strip_fraction_zeros(mantissa) };
        out.write_str(as_str(mantissa))?;
        write!(out, "{}{exponent:+03}", if upper { 'E' } else { 'e' })
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        write!(body, "{value:.decimals$}")?;
        let digits = if alt { body.as_bytes() } else { strip_fraction_zeros(body.as_bytes()) };
        out.write_str(as_str(digits))
    }
}

/// Converts a number to its canonical text form: `%.8g`, or `NaN`.
#[must_use]
pub fn number_to_text(value: f64) -> FixedString {
    if value.is_nan() {
        return FixedString::from("NaN");
    }
    let mut buf = ScratchBuf::<64>::new();
    // ScratchBuf never reports an error.
    let _ = write_general(&mut buf, value, TEXT_PRECISION, false, false);
    FixedString::from_bytes(buf.as_bytes())
}

fn write_non_finite<W: Write>(out: &mut W, value: f64, upper: bool) -> fmt::Result {
    let text = match (value.is_nan(), value.is_sign_negative(), upper) {
        (true, _, false) => "nan",
        (true, _, true) => "NAN",
        (false, true, false) => "-inf",
        (false, true, true) => "-INF",
        (false, false, false) => "inf",
        (false, false, true) => "INF",
    };
    out.write_str(text)
}

fn split_exponent(formatted: &[u8]) -> (&[u8], i32) {
    match formatted.iter().position(|&b| b == b'e') {
        Some(e) => {
            let exponent = as_str(&formatted[e + 1..]).parse().unwrap_or(0);
            (&formatted[..e], exponent)
        }
        None => (formatted, 0),
    }
}

fn strip_fraction_zeros(digits: &[u8]) -> &[u8] {
    if !digits.contains(&b'.') {
        return digits;
    }
    let mut end = digits.len();
    while end > 0 && digits[end - 1] == b'0' {
        end -= 1;
    }
    if end > 0 && digits[end - 1] == b'.' {
        end -= 1;
    }
    &digits[..end]
}

fn as_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap_or("")
}
