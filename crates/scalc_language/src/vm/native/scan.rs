//! `SSCANF` and binary `READ`: pulling one value out of a string.
//!
//! Both locate the single assigning conversion of a `scanf`-style format,
//! skipping `%%` and `*`-suppressed conversions (character classes
//! included). `SSCANF` then runs a small `scanf` interpreter over the whole
//! format; `READ` unpacks a little-endian binary scalar instead.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use scalc_foundation::numeric::{parse_prefix, hex_value};
use scalc_foundation::{Error, EvalErrorKind, FixedString, Result, Value};

use super::escape::translate_escapes;
use super::format::Length;
use super::{FORMAT_LIMIT, Scratch};

/// Characters that end a conversion when locating the assigning one.
const INDICATORS: &[u8] = b"pwn$c[deEfgGiousxX";

fn bad_format(op: &'static str, reason: &'static str) -> Error {
    Error::eval(EvalErrorKind::BadFormat { op, reason })
}

fn failed(op: &'static str) -> Error {
    Error::eval(EvalErrorKind::ConversionFailed { op })
}

fn text_operands<'a>(
    input: &'a Value,
    format: &'a Value,
    op: &'static str,
) -> Result<(&'a FixedString, &'a FixedString)> {
    match (input, format) {
        (Value::Text(input), Value::Text(format)) => Ok((input, format)),
        _ => Err(Error::eval(EvalErrorKind::NotAString { op })),
    }
}

/// Returns the offset just past a `[...]` class whose `[` is at `open`.
fn skip_class(fmt: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if fmt.get(i) == Some(&b'^') {
        i += 1;
    }
    if fmt.get(i) == Some(&b']') {
        i += 1;
    }
    let close = fmt[i.min(fmt.len())..].iter().position(|&b| b == b']')?;
    Some(i + close + 1)
}

/// Finds the conversion character of the first non-suppressed conversion
/// at or after `from`.
fn next_assignment(fmt: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    loop {
        let percent = i + fmt.get(i..)?.iter().position(|&b| b == b'%')?;
        if fmt.get(percent + 1) == Some(&b'%') {
            i = percent + 2;
            continue;
        }
        let indicator =
            percent + 1 + fmt[percent + 1..].iter().position(|b| INDICATORS.contains(b))?;
        if !fmt[percent + 1..indicator].contains(&b'*') {
            return Some(indicator);
        }
        i = if fmt[indicator] == b'[' {
            skip_class(fmt, indicator)?
        } else {
            indicator + 1
        };
    }
}

/// Finds the one assigning conversion of an input format.
///
/// Returns the offset of its conversion character.
pub(crate) fn find_assignment(fmt: &[u8], op: &'static str) -> Result<usize> {
    let at = next_assignment(fmt, 0).ok_or_else(|| bad_format(op, "no conversion"))?;
    if matches!(fmt[at], b'p' | b'w' | b'n' | b'$') {
        return Err(bad_format(op, "unsupported conversion"));
    }
    let rest = if fmt[at] == b'[' { skip_class(fmt, at) } else { Some(at + 1) };
    if rest.and_then(|rest| next_assignment(fmt, rest)).is_some() {
        return Err(bad_format(op, "more than one conversion"));
    }
    Ok(at)
}

fn length_before(fmt: &[u8], at: usize) -> Length {
    match &fmt[..at] {
        [.., b'h', b'h'] => Length::Char,
        [.., b'l', b'l'] => Length::LongLong,
        [.., b'h'] => Length::Short,
        [.., b'l' | b'L' | b'q' | b'j' | b'z' | b't'] => Length::Long,
        _ => Length::Int,
    }
}

// =============================================================================
// scanf interpreter
// =============================================================================

/// One `%` directive of an input format.
struct Directive {
    suppress: bool,
    width: Option<usize>,
    length: Length,
    kind: u8,
    /// Byte range of a `[...]` class body, `^` included.
    class: (usize, usize),
    end: usize,
}

impl Directive {
    fn parse(fmt: &[u8], start: usize) -> Option<Self> {
        let mut i = start + 1;
        if fmt.get(i) == Some(&b'%') {
            return Some(Self {
                suppress: true,
                width: None,
                length: Length::Int,
                kind: b'%',
                class: (0, 0),
                end: i + 1,
            });
        }
        let suppress = fmt.get(i) == Some(&b'*');
        if suppress {
            i += 1;
        }
        let digits = fmt[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        let width = (digits > 0).then(|| {
            fmt[i..i + digits]
                .iter()
                .fold(0usize, |acc, &b| acc.saturating_mul(10).saturating_add(usize::from(b - b'0')))
        });
        i += digits;
        while matches!(fmt.get(i), Some(b'h' | b'l' | b'L' | b'q' | b'j' | b'z' | b't')) {
            i += 1;
        }
        let kind = *fmt.get(i)?;
        let length = length_before(fmt, i);
        let (class, end) = match kind {
            b'[' => {
                let end = skip_class(fmt, i)?;
                ((i + 1, end - 1), end)
            }
            b'c' | b'd' | b'i' | b'o' | b'u' | b'x' | b'X' | b'e' | b'E' | b'f' | b'g' | b'G'
            | b's' => ((0, 0), i + 1),
            _ => return None,
        };
        Some(Self {
            suppress,
            width,
            length,
            kind,
            class,
            end,
        })
    }
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn skip_whitespace(&mut self) {
        while self.input.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    /// The unread input, limited to `width` bytes.
    fn field(&self, width: Option<usize>) -> &'a [u8] {
        let rest = &self.input[self.pos..];
        &rest[..width.map_or(rest.len(), |w| w.min(rest.len()))]
    }

    fn integer(&mut self, width: Option<usize>, radix: Option<u32>) -> Option<i64> {
        let field = self.field(width);
        let mut i = 0;
        let negative = match field.first() {
            Some(b'-') => {
                i = 1;
                true
            }
            Some(b'+') => {
                i = 1;
                false
            }
            _ => false,
        };
        let has_hex_prefix = field.get(i) == Some(&b'0')
            && matches!(field.get(i + 1), Some(b'x' | b'X'))
            && field.get(i + 2).copied().and_then(hex_value).is_some();
        let radix = match radix {
            Some(16) | None if has_hex_prefix => {
                i += 2;
                16
            }
            Some(radix) => radix,
            None if field.get(i) == Some(&b'0') => 8,
            None => 10,
        };
        let start = i;
        let mut value = 0u64;
        while let Some(digit) = field.get(i).and_then(|&b| char::from(b).to_digit(radix)) {
            value = value.wrapping_mul(u64::from(radix)).wrapping_add(u64::from(digit));
            i += 1;
        }
        if i == start {
            return None;
        }
        self.pos += i;
        let value = value as i64;
        Some(if negative { value.wrapping_neg() } else { value })
    }

    fn float(&mut self, width: Option<usize>) -> Option<f64> {
        let (value, len) = parse_prefix(self.field(width))?;
        self.pos += len;
        Some(value)
    }

    fn take_while(&mut self, width: Option<usize>, keep: impl Fn(u8) -> bool) -> Option<&'a [u8]> {
        let field = self.field(width);
        let len = field.iter().take_while(|&&b| keep(b)).count();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&field[..len])
    }
}

fn in_class(class: &[u8], byte: u8) -> bool {
    let (negated, class) = match class {
        [b'^', rest @ ..] => (true, rest),
        _ => (false, class),
    };
    let mut found = false;
    let mut i = 0;
    while i < class.len() {
        if i + 2 < class.len() && class[i + 1] == b'-' {
            if (class[i]..=class[i + 2]).contains(&byte) {
                found = true;
            }
            i += 3;
        } else {
            if class[i] == byte {
                found = true;
            }
            i += 1;
        }
    }
    found != negated
}

fn integer_value(kind: u8, length: Length, value: i64) -> f64 {
    match (kind, length) {
        (b'd' | b'i', Length::Short | Length::Char) => f64::from(value as i16),
        (b'd' | b'i', Length::Long | Length::LongLong) => value as f64,
        (b'd' | b'i', Length::Int) => f64::from(value as i32),
        (_, Length::Short | Length::Char) => f64::from(value as u16),
        (_, Length::Long | Length::LongLong) => (value as u64) as f64,
        (_, Length::Int) => f64::from(value as u32),
    }
}

/// Runs `fmt` over `input` the way `sscanf` does and returns the value of
/// the one assigning conversion, if it matched.
fn scan(input: &[u8], fmt: &[u8]) -> Option<Value> {
    let mut scanner = Scanner { input, pos: 0 };
    let mut assigned = None;
    let mut fi = 0;
    while fi < fmt.len() {
        let c = fmt[fi];
        if c.is_ascii_whitespace() {
            scanner.skip_whitespace();
            fi += 1;
            continue;
        }
        if c != b'%' {
            if input.get(scanner.pos) != Some(&c) {
                break;
            }
            scanner.pos += 1;
            fi += 1;
            continue;
        }

        let directive = Directive::parse(fmt, fi)?;
        fi = directive.end;
        if !matches!(directive.kind, b'c' | b'[') {
            scanner.skip_whitespace();
        }
        if scanner.pos >= input.len() {
            break;
        }
        let value = match directive.kind {
            b'%' => {
                if input[scanner.pos] != b'%' {
                    break;
                }
                scanner.pos += 1;
                continue;
            }
            b'd' | b'u' => scanner.integer(directive.width, Some(10)),
            b'i' => scanner.integer(directive.width, None),
            b'o' => scanner.integer(directive.width, Some(8)),
            b'x' | b'X' => scanner.integer(directive.width, Some(16)),
            b'e' | b'E' | b'f' | b'g' | b'G' => {
                let Some(value) = scanner.float(directive.width) else {
                    break;
                };
                let value = if matches!(directive.length, Length::Long | Length::LongLong) {
                    value
                } else {
                    f64::from(value as f32)
                };
                if !directive.suppress {
                    assigned = Some(Value::Number(value));
                }
                continue;
            }
            _ => {
                let text = match directive.kind {
                    b'c' => scanner.take_while(Some(directive.width.unwrap_or(1)), |_| true),
                    b's' => scanner.take_while(directive.width, |b| !b.is_ascii_whitespace()),
                    _ => {
                        let class = &fmt[directive.class.0..directive.class.1];
                        scanner.take_while(directive.width, |b| in_class(class, b))
                    }
                };
                let Some(text) = text else { break };
                if !directive.suppress {
                    assigned = Some(Value::Text(FixedString::from_bytes_limited(
                        text,
                        FORMAT_LIMIT,
                    )));
                }
                continue;
            }
        };
        let Some(value) = value else { break };
        if !directive.suppress {
            assigned = Some(Value::Number(integer_value(
                directive.kind,
                directive.length,
                value,
            )));
        }
    }
    assigned
}

/// `SSCANF(input, format)`: extracts one number or string from `input`.
///
/// # Errors
///
/// Fails if either operand is a number, the format does not hold exactly one
/// assigning conversion, or the conversion does not match.
pub(crate) fn sscanf(input: &Value, format: &Value) -> Result<Value> {
    let (input, format) = text_operands(input, format, "SSCANF")?;
    let fmt = format.as_bytes();
    find_assignment(fmt, "SSCANF")?;
    scan(input.as_bytes(), fmt).ok_or_else(|| failed("SSCANF"))
}

/// Number of bytes a `%*N<conv>` prefix asks `READ` to skip.
fn skip_count(fmt: &[u8], conversion: usize) -> usize {
    let Some(star) = fmt.iter().position(|&b| b == b'*') else {
        return 0;
    };
    if star >= conversion {
        return 0;
    }
    let mut i = star + 1;
    let digits = fmt[i..].iter().take_while(|b| b.is_ascii_digit()).count();
    let count = if digits == 0 {
        1
    } else {
        fmt[i..i + digits]
            .iter()
            .fold(0usize, |acc, &b| acc.saturating_mul(10).saturating_add(usize::from(b - b'0')))
    };
    i += digits;
    let scale = match fmt.get(i) {
        Some(b'h') => 2,
        Some(b'l') if fmt[i..].iter().any(|b| b"diouxX".contains(b)) => 4,
        Some(b'l') => 8,
        Some(b'd' | b'i' | b'o' | b'u' | b'x' | b'X' | b'e' | b'E' | b'f' | b'g' | b'G') => 4,
        _ => 1,
    };
    count.saturating_mul(scale)
}

/// `READ(input, format)`: unpacks one little-endian binary scalar from the
/// escape-translated `input`.
///
/// # Errors
///
/// Fails if either operand is a number, the format does not hold exactly one
/// assigning numeric conversion, or the input is too short.
pub(crate) fn bin_read(input: &Value, format: &Value) -> Result<f64> {
    let (input, format) = text_operands(input, format, "READ")?;
    let fmt = format.as_bytes();
    let at = find_assignment(fmt, "READ")?;

    let mut raw = Scratch::new();
    translate_escapes(input.as_bytes(), &mut raw);
    let data = raw.as_bytes().get(skip_count(fmt, at)..).unwrap_or_default();

    let length = length_before(fmt, at);
    let width = match fmt[at] {
        b'c' => 1,
        b'd' | b'i' | b'o' | b'u' | b'x' | b'X' if length == Length::Short => 2,
        b'd' | b'i' | b'o' | b'u' | b'x' | b'X' => 4,
        b'e' | b'E' | b'f' | b'g' | b'G' if length == Length::Long => 8,
        b'e' | b'E' | b'f' | b'g' | b'G' => 4,
        _ => return Err(bad_format("READ", "string conversion")),
    };
    let bytes = data.get(..width).ok_or_else(|| failed("READ"))?;
    let mut word = [0u8; 8];
    word[..width].copy_from_slice(bytes);

    Ok(match (fmt[at], width) {
        (b'c', _) => f64::from(word[0] as i8),
        (b'd' | b'i', 2) => f64::from(i16::from_le_bytes([word[0], word[1]])),
        (b'd' | b'i', _) => f64::from(i32::from_le_bytes([word[0], word[1], word[2], word[3]])),
        (b'o' | b'u' | b'x' | b'X', 2) => f64::from(u16::from_le_bytes([word[0], word[1]])),
        (b'o' | b'u' | b'x' | b'X', _) => {
            f64::from(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        }
        (_, 8) => f64::from_le_bytes(word),
        _ => f64::from(f32::from_le_bytes([word[0], word[1], word[2], word[3]])),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(input: &str, fmt: &str) -> Result<Value> {
        sscanf(&Value::text(input), &Value::text(fmt))
    }

    fn r(input: &str, fmt: &str) -> Result<f64> {
        bin_read(&Value::text(input), &Value::text(fmt))
    }

    #[test]
    fn finds_the_assigning_conversion() {
        assert_eq!(find_assignment(b"%d", "T").unwrap(), 1);
        assert_eq!(find_assignment(b"%%x=%*d %5hd", "T").unwrap(), 11);
        assert_eq!(find_assignment(b"%*[^,],%s", "T").unwrap(), 8);
        assert_eq!(find_assignment(b"%*[]x] %f", "T").unwrap(), 8);
    }

    #[test]
    fn rejects_unusable_formats() {
        for fmt in ["no conversions", "%%", "%*d", "%n", "%p", "%1$d", "%d %d"] {
            let err = find_assignment(fmt.as_bytes(), "T").unwrap_err();
            assert!(matches!(err.eval_kind(), Some(EvalErrorKind::BadFormat { .. })), "{fmt}");
        }
    }

    #[test]
    fn scans_integers() {
        assert_eq!(s("  42abc", "%d").unwrap(), Value::Number(42.0));
        assert_eq!(s("x=-17", "x=%d").unwrap(), Value::Number(-17.0));
        assert_eq!(s("0x1f", "%x").unwrap(), Value::Number(31.0));
        assert_eq!(s("0x1f", "%i").unwrap(), Value::Number(31.0));
        assert_eq!(s("017", "%i").unwrap(), Value::Number(15.0));
        assert_eq!(s("12345", "%3d").unwrap(), Value::Number(123.0));
        assert_eq!(s("70000", "%hd").unwrap(), Value::Number(4464.0));
        assert_eq!(s("-1", "%u").unwrap(), Value::Number(4_294_967_295.0));
    }

    #[test]
    fn scans_floats() {
        assert_eq!(s("1.5e2", "%lf").unwrap(), Value::Number(150.0));
        assert_eq!(s("0.1", "%f").unwrap(), Value::Number(f64::from(0.1_f32)));
        assert_eq!(s("T=3.25 K", "T=%lf K").unwrap(), Value::Number(3.25));
    }

    #[test]
    fn scans_strings() {
        assert_eq!(s("  hello world", "%s").unwrap(), Value::text("hello"));
        assert_eq!(s("abc,def", "%*[^,],%s").unwrap(), Value::text("def"));
        assert_eq!(s("abc123", "%[a-z]").unwrap(), Value::text("abc"));
        assert_eq!(s("xyz", "%2c").unwrap(), Value::text("xy"));
    }

    #[test]
    fn scan_failures() {
        let err = s("abc", "%d").unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::ConversionFailed { .. })));
        let err = s("", "%s").unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::ConversionFailed { .. })));
        let err = sscanf(&Value::Number(1.0), &Value::text("%d")).unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::NotAString { .. })));
    }

    #[test]
    fn reads_binary_scalars() {
        assert_eq!(r(r"\x01\x02", "%hd").unwrap(), 513.0);
        assert_eq!(r(r"\xff\xff", "%hd").unwrap(), -1.0);
        assert_eq!(r(r"\xff\xff", "%hu").unwrap(), 65535.0);
        assert_eq!(r(r"\x00\x00\x80?", "%f").unwrap(), 1.0);
        assert_eq!(r(r"\xfe", "%c").unwrap(), -2.0);
        assert_eq!(r(r"\x01\x00\x00\x00", "%d").unwrap(), 1.0);
    }

    #[test]
    fn read_honors_skip_prefix() {
        assert_eq!(skip_count(b"%*2hd%hd", 7), 4);
        assert_eq!(skip_count(b"%*f%f", 4), 4);
        assert_eq!(skip_count(b"%*lf%f", 5), 8);
        assert_eq!(skip_count(b"%*3%c", 4), 3);
        assert_eq!(r(r"\x00\x00\x05\x00", "%*hd%hd").unwrap(), 5.0);
    }

    #[test]
    fn read_failures() {
        let err = r(r"\x01", "%d").unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::ConversionFailed { .. })));
        let err = r("abc", "%s").unwrap_err();
        assert!(matches!(err.eval_kind(), Some(EvalErrorKind::BadFormat { .. })));
    }
}
