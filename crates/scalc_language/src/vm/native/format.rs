//! `PRINTF` and binary `WRITE`: pushing one value through a C format string.
//!
//! Only a single conversion is supported per format. [`Conversion`] parses a
//! `printf`-style directive (flags, width, precision, length modifier and
//! conversion character); the formatter then renders it with C semantics.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use scalc_foundation::numeric::{nint_index, write_exp, write_fixed, write_general};
use scalc_foundation::{Error, EvalErrorKind, FixedString, Result, Value};

use super::escape::escape;
use super::{FORMAT_LIMIT, Scratch};

/// Widths and precisions beyond this are clamped; output is truncated long
/// before they could matter.
const MAX_FIELD: usize = 64;

const DEFAULT_PRECISION: usize = 6;

/// `printf` flag characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags {
    pub left: bool,
    pub plus: bool,
    pub space: bool,
    pub alt: bool,
    pub zero: bool,
}

/// Length modifier of a conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Length {
    /// `hh`
    Char,
    /// `h`
    Short,
    /// none
    Int,
    /// `l`, `L`, `q`, `j`, `z`, `t`
    Long,
    /// `ll`
    LongLong,
}

impl Length {
    fn signed(self, value: i64) -> i64 {
        match self {
            Self::Char => i64::from(value as i8),
            Self::Short => i64::from(value as i16),
            Self::Int => i64::from(value as i32),
            Self::Long | Self::LongLong => value,
        }
    }

    fn unsigned(self, value: i64) -> u64 {
        match self {
            Self::Char => u64::from(value as u8),
            Self::Short => u64::from(value as u16),
            Self::Int => u64::from(value as u32),
            Self::Long | Self::LongLong => value as u64,
        }
    }
}

/// One parsed `%` directive of an output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Conversion {
    /// Offset of the `%`.
    pub start: usize,
    /// Offset just past the conversion character.
    pub end: usize,
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub length: Length,
    /// Conversion character.
    pub kind: u8,
}

impl Conversion {
    /// Parses the directive whose `%` is at `fmt[start]`.
    fn parse(fmt: &[u8], start: usize) -> std::result::Result<Self, &'static str> {
        let mut i = start + 1;
        let mut flags = Flags::default();
        while let Some(&c) = fmt.get(i) {
            match c {
                b'-' => flags.left = true,
                b'+' => flags.plus = true,
                b' ' => flags.space = true,
                b'#' => flags.alt = true,
                b'0' => flags.zero = true,
                _ => break,
            }
            i += 1;
        }

        if fmt.get(i) == Some(&b'*') {
            return Err("'*' width is not supported");
        }
        let width = parse_count(fmt, &mut i);

        let mut precision = None;
        if fmt.get(i) == Some(&b'.') {
            i += 1;
            if fmt.get(i) == Some(&b'*') {
                return Err("'*' precision is not supported");
            }
            precision = Some(parse_count(fmt, &mut i).unwrap_or(0));
        }

        let length = match fmt.get(i..i + 2) {
            Some(b"hh") => {
                i += 2;
                Length::Char
            }
            Some(b"ll") => {
                i += 2;
                Length::LongLong
            }
            _ => match fmt.get(i) {
                Some(b'h') => {
                    i += 1;
                    Length::Short
                }
                Some(b'l' | b'L' | b'q' | b'j' | b'z' | b't') => {
                    i += 1;
                    Length::Long
                }
                _ => Length::Int,
            },
        };

        match fmt.get(i) {
            None => Err("incomplete conversion"),
            Some(&kind) if b"cdiouxXeEfgGs".contains(&kind) => Ok(Self {
                start,
                end: i + 1,
                flags,
                width,
                precision,
                length,
                kind,
            }),
            Some(_) => Err("unsupported conversion"),
        }
    }

    fn is_float(&self) -> bool {
        matches!(self.kind, b'e' | b'E' | b'f' | b'g' | b'G')
    }
}

fn parse_count(fmt: &[u8], i: &mut usize) -> Option<usize> {
    let digits = fmt[*i..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let value = fmt[*i..*i + digits]
        .iter()
        .fold(0usize, |acc, &b| acc.saturating_mul(10).saturating_add(usize::from(b - b'0')));
    *i += digits;
    Some(value.min(MAX_FIELD))
}

fn bad_format(op: &'static str, reason: &'static str) -> Error {
    Error::eval(EvalErrorKind::BadFormat { op, reason })
}

/// Finds the one conversion in an output format, skipping `%%`.
///
/// Returns `None` if the format has no conversion at all.
pub(crate) fn single_conversion(fmt: &[u8], op: &'static str) -> Result<Option<Conversion>> {
    let mut found = None;
    let mut i = 0;
    while i < fmt.len() {
        if fmt[i] != b'%' {
            i += 1;
            continue;
        }
        if fmt.get(i + 1) == Some(&b'%') {
            i += 2;
            continue;
        }
        let conversion = Conversion::parse(fmt, i).map_err(|reason| bad_format(op, reason))?;
        if found.is_some() {
            return Err(bad_format(op, "more than one conversion"));
        }
        i = conversion.end;
        found = Some(conversion);
    }
    Ok(found)
}

/// Copies literal format text, collapsing `%%` to `%`.
fn push_literal(out: &mut Scratch, text: &[u8]) {
    let mut i = 0;
    while i < text.len() {
        out.push(text[i]);
        i += if text[i] == b'%' && text.get(i + 1) == Some(&b'%') { 2 } else { 1 };
    }
}

fn integer_argument(arg: &mut Value) -> i64 {
    i64::from(nint_index(arg.coerce_number()))
}

/// Writes `body` into `out` padded to the conversion's width.
///
/// `prefix` (sign, `0x`) stays in front of zero padding.
fn pad(out: &mut Scratch, conversion: &Conversion, prefix: &[u8], body: &[u8], zero_ok: bool) {
    let len = prefix.len() + body.len();
    let fill = conversion.width.unwrap_or(0).saturating_sub(len);
    if conversion.flags.left {
        out.push_bytes(prefix);
        out.push_bytes(body);
        (0..fill).for_each(|_| out.push(b' '));
    } else if conversion.flags.zero && zero_ok {
        out.push_bytes(prefix);
        (0..fill).for_each(|_| out.push(b'0'));
        out.push_bytes(body);
    } else {
        (0..fill).for_each(|_| out.push(b' '));
        out.push_bytes(prefix);
        out.push_bytes(body);
    }
}

fn sign_prefix(negative: bool, flags: Flags) -> &'static [u8] {
    if negative {
        b"-"
    } else if flags.plus {
        b"+"
    } else if flags.space {
        b" "
    } else {
        b""
    }
}

/// Renders `magnitude` in `radix`, honoring a minimum digit count.
fn digits(out: &mut Scratch, mut magnitude: u64, radix: u64, upper: bool, precision: Option<usize>) {
    let table: &[u8; 16] = if upper { b"0123456789ABCDEF" } else { b"0123456789abcdef" };
    let mut reversed = [0u8; 64];
    let mut n = 0;
    while magnitude > 0 {
        reversed[n] = table[(magnitude % radix) as usize];
        magnitude /= radix;
        n += 1;
    }
    let min_digits = precision.unwrap_or(1);
    (n..min_digits).for_each(|_| out.push(b'0'));
    for &d in reversed[..n].iter().rev() {
        out.push(d);
    }
}

fn format_integer(out: &mut Scratch, conversion: &Conversion, arg: &mut Value) {
    let value = integer_argument(arg);
    let mut body = Scratch::new();
    let zero_ok = conversion.precision.is_none();
    match conversion.kind {
        b'd' | b'i' => {
            let value = conversion.length.signed(value);
            digits(&mut body, value.unsigned_abs(), 10, false, conversion.precision);
            pad(out, conversion, sign_prefix(value < 0, conversion.flags), body.as_bytes(), zero_ok);
        }
        kind => {
            let value = conversion.length.unsigned(value);
            let (radix, upper) = match kind {
                b'o' => (8, false),
                b'x' => (16, false),
                b'X' => (16, true),
                _ => (10, false),
            };
            digits(&mut body, value, radix, upper, conversion.precision);
            let prefix: &[u8] = match kind {
                b'o' if conversion.flags.alt && body.as_bytes().first() != Some(&b'0') => b"0",
                b'x' if conversion.flags.alt && value != 0 => b"0x",
                b'X' if conversion.flags.alt && value != 0 => b"0X",
                _ => b"",
            };
            pad(out, conversion, prefix, body.as_bytes(), zero_ok);
        }
    }
}

fn format_float(out: &mut Scratch, conversion: &Conversion, value: f64) {
    let precision = conversion.precision.unwrap_or(DEFAULT_PRECISION);
    let upper = conversion.kind.is_ascii_uppercase();
    let magnitude = value.abs();
    let mut body = Scratch::new();
    // ScratchBuf never reports an error.
    let _ = match conversion.kind {
        b'f' => write_fixed(&mut body, magnitude, precision, upper),
        b'e' | b'E' => write_exp(&mut body, magnitude, precision, upper),
        _ => write_general(&mut body, magnitude, precision, conversion.flags.alt, upper),
    };
    if conversion.flags.alt && conversion.kind == b'f' && precision == 0 {
        body.push(b'.');
    }
    let negative = value.is_sign_negative() && !value.is_nan();
    let prefix = sign_prefix(negative, conversion.flags);
    pad(out, conversion, prefix, body.as_bytes(), value.is_finite());
}

fn format_value(out: &mut Scratch, conversion: &Conversion, arg: &mut Value) {
    match conversion.kind {
        b'c' => {
            let byte = integer_argument(arg).to_le_bytes()[0];
            pad(out, conversion, b"", &[byte], false);
        }
        b's' => {
            let text = arg.coerce_text();
            let bytes = text.as_bytes();
            let bytes = &bytes[..conversion.precision.map_or(bytes.len(), |p| p.min(bytes.len()))];
            pad(out, conversion, b"", bytes, false);
        }
        _ if conversion.is_float() => format_float(out, conversion, arg.coerce_number()),
        _ => format_integer(out, conversion, arg),
    }
}

/// `PRINTF(format, value)`: formats `value` with a single-conversion format.
///
/// A format without conversions is printed as-is (with `%%` collapsed).
///
/// # Errors
///
/// Fails if the format is not a string or does not hold exactly zero or one
/// supported conversion.
pub(crate) fn printf(format: &Value, arg: &mut Value) -> Result<FixedString> {
    let Value::Text(format) = format else {
        return Err(Error::eval(EvalErrorKind::NotAString { op: "PRINTF" }));
    };
    let fmt = format.as_bytes();
    let mut out = Scratch::new();
    match single_conversion(fmt, "PRINTF")? {
        None => push_literal(&mut out, fmt),
        Some(conversion) => {
            push_literal(&mut out, &fmt[..conversion.start]);
            format_value(&mut out, &conversion, arg);
            push_literal(&mut out, &fmt[conversion.end..]);
        }
    }
    Ok(FixedString::from_bytes_limited(out.as_bytes(), FORMAT_LIMIT))
}

/// `WRITE(format, value)`: packs `value` as the little-endian binary scalar the
/// conversion names and returns it escaped.
///
/// # Errors
///
/// Fails if the format is not a string, has no conversion, or names a string
/// conversion.
pub(crate) fn bin_write(format: &Value, arg: &mut Value) -> Result<FixedString> {
    let Value::Text(format) = format else {
        return Err(Error::eval(EvalErrorKind::NotAString { op: "WRITE" }));
    };
    let conversion = single_conversion(format.as_bytes(), "WRITE")?
        .ok_or_else(|| bad_format("WRITE", "no conversion"))?;

    let mut packed = [0u8; 8];
    let width = match conversion.kind {
        b's' => return Err(bad_format("WRITE", "string conversion")),
        b'c' => {
            packed[0] = integer_argument(arg).to_le_bytes()[0];
            1
        }
        b'd' | b'i' | b'o' | b'u' | b'x' | b'X' => {
            let value = integer_argument(arg);
            if conversion.length == Length::Short {
                packed[..2].copy_from_slice(&(value as i16).to_le_bytes());
                2
            } else {
                packed[..4].copy_from_slice(&(value as i32).to_le_bytes());
                4
            }
        }
        _ => {
            let value = arg.coerce_number();
            if conversion.length == Length::Long {
                packed.copy_from_slice(&value.to_le_bytes());
                8
            } else {
                packed[..4].copy_from_slice(&(value as f32).to_le_bytes());
                4
            }
        }
    };

    let mut out = Scratch::new();
    escape(&packed[..width], &mut out);
    Ok(FixedString::from_bytes_limited(out.as_bytes(), FORMAT_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(fmt: &str, arg: Value) -> String {
        let mut arg = arg;
        printf(&Value::text(fmt), &mut arg).unwrap().to_string_lossy()
    }

    fn w(fmt: &str, arg: f64) -> String {
        bin_write(&Value::text(fmt), &mut Value::Number(arg))
            .unwrap()
            .to_string_lossy()
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(p("%d", Value::Number(2.5)), "3");
        assert_eq!(p("%5d|", Value::Number(-42.0)), "  -42|");
        assert_eq!(p("%-5d|", Value::Number(7.0)), "7    |");
        assert_eq!(p("%05d", Value::Number(-7.0)), "-0007");
        assert_eq!(p("%+d", Value::Number(7.0)), "+7");
        assert_eq!(p("%.3d", Value::Number(7.0)), "007");
        assert_eq!(p("%x", Value::Number(255.0)), "ff");
        assert_eq!(p("%#X", Value::Number(255.0)), "0XFF");
        assert_eq!(p("%#o", Value::Number(8.0)), "010");
        assert_eq!(p("%u", Value::Number(-1.0)), "4294967295");
        assert_eq!(p("%hu", Value::Number(-1.0)), "65535");
        assert_eq!(p("%c", Value::Number(65.0)), "A");
    }

    #[test]
    fn float_conversions() {
        assert_eq!(p("%.2f", Value::Number(3.14159)), "3.14");
        assert_eq!(p("%8.3f|", Value::Number(-1.5)), "  -1.500|");
        assert_eq!(p("%e", Value::Number(1234.5)), "1.234500e+03");
        assert_eq!(p("%G", Value::Number(0.000_012_5)), "1.25E-05");
        assert_eq!(p("%g", Value::Number(100.0)), "100");
        assert_eq!(p("%f", Value::text("2.5xyz")), "2.500000");
    }

    #[test]
    fn string_conversion() {
        assert_eq!(p("<%s>", Value::text("abc")), "<abc>");
        assert_eq!(p("<%.2s>", Value::text("abc")), "<ab>");
        assert_eq!(p("<%5s>", Value::text("abc")), "<  abc>");
        assert_eq!(p("%s", Value::Number(1.5)), "1.5");
    }

    #[test]
    fn literal_only_format() {
        assert_eq!(p("100%%", Value::Number(1.0)), "100%");
        assert_eq!(p("%d%%", Value::Number(50.0)), "50%");
    }

    #[test]
    fn rejects_bad_formats() {
        for fmt in ["%*d", "%d %d", "%p", "%", "%.*f"] {
            let err = printf(&Value::text(fmt), &mut Value::Number(1.0)).unwrap_err();
            assert!(
                matches!(err.eval_kind(), Some(EvalErrorKind::BadFormat { .. })),
                "{fmt}"
            );
        }
        let err = printf(&Value::Number(1.0), &mut Value::Number(1.0)).unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::NotAString { .. })));
    }

    #[test]
    fn output_is_truncated() {
        let out = p("%40d", Value::Number(1.0));
        assert_eq!(out.len(), FORMAT_LIMIT);
    }

    #[test]
    fn binary_write_widths() {
        assert_eq!(w("%c", 65.0), "A");
        assert_eq!(w("%hd", 258.0), r"\x02\x01");
        assert_eq!(w("%d", 1.0), r"\x01\x00\x00\x00");
        assert_eq!(w("%x", -1.0), r"\xff\xff\xff\xff");
        assert_eq!(w("%f", 1.0), r"\x00\x00\x80?");
        assert_eq!(w("%lf", 2.0), r"\x00\x00\x00\x00\x00\x00\x00@");
    }

    #[test]
    fn binary_write_rejects_strings() {
        for fmt in ["%s", "no conversion"] {
            let err = bin_write(&Value::text(fmt), &mut Value::Number(1.0)).unwrap_err();
            assert!(matches!(err.eval_kind(), Some(EvalErrorKind::BadFormat { .. })));
        }
    }
}
