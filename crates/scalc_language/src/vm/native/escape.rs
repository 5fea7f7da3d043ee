//! C escape sequences in both directions.
//!
//! Translation turns `\n`, `\x1b`, `\033` and friends into raw bytes;
//! escaping turns raw bytes back into printable text.

use std::fmt::Write;

use scalc_foundation::numeric::{ScratchBuf, hex_value};
use scalc_foundation::{FixedString, Value};

use super::{FORMAT_LIMIT, Scratch};

/// Appends `src` to `out` with C escape sequences translated to raw bytes.
///
/// Octal escapes take up to three digits and `\x` up to two hex digits; an
/// unknown escape yields the escaped character itself.
pub(crate) fn translate_escapes<const N: usize>(src: &[u8], out: &mut ScratchBuf<N>) {
    let mut i = 0;
    while i < src.len() {
        let byte = src[i];
        i += 1;
        if byte != b'\\' || i == src.len() {
            out.push(byte);
            continue;
        }
        let code = src[i];
        i += 1;
        match code {
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'0'..=b'7' => {
                let mut value = u32::from(code - b'0');
                let mut digits = 1;
                while digits < 3 && i < src.len() && matches!(src[i], b'0'..=b'7') {
                    value = value * 8 + u32::from(src[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push(value.to_le_bytes()[0]);
            }
            b'x' => {
                let mut value = 0u8;
                let mut digits = 0;
                while digits < 2 {
                    let Some(nibble) = src.get(i).copied().and_then(hex_value) else {
                        break;
                    };
                    value = (value << 4) | nibble;
                    i += 1;
                    digits += 1;
                }
                if digits == 0 {
                    out.push(b'x');
                } else {
                    out.push(value);
                }
            }
            other => out.push(other),
        }
    }
}

/// Appends `src` to `out` as printable text: printable ASCII as-is, the usual
/// C escapes, and `\xNN` for everything else.
pub(crate) fn escape<const N: usize>(src: &[u8], out: &mut ScratchBuf<N>) {
    for &byte in src {
        match byte {
            0x07 => out.push_bytes(b"\\a"),
            0x08 => out.push_bytes(b"\\b"),
            0x0c => out.push_bytes(b"\\f"),
            b'\n' => out.push_bytes(b"\\n"),
            b'\r' => out.push_bytes(b"\\r"),
            b'\t' => out.push_bytes(b"\\t"),
            0x0b => out.push_bytes(b"\\v"),
            b'\\' => out.push_bytes(b"\\\\"),
            b'\'' => out.push_bytes(b"\\'"),
            b'"' => out.push_bytes(b"\\\""),
            0x20..=0x7e => out.push(byte),
            _ => {
                // ScratchBuf never reports an error.
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
}

/// `$T`: replaces a string with its escape-translated bytes.
pub(crate) fn translate_op(value: &mut Value) {
    if let Value::Text(s) = value {
        let mut raw = Scratch::new();
        translate_escapes(s.as_bytes(), &mut raw);
        *s = FixedString::from_bytes_limited(raw.as_bytes(), FORMAT_LIMIT);
    }
}

/// `$E`: replaces a string with its escaped form.
pub(crate) fn escape_op(value: &mut Value) {
    if let Value::Text(s) = value {
        let mut text = Scratch::new();
        escape(s.as_bytes(), &mut text);
        *s = FixedString::from_bytes_limited(text.as_bytes(), FORMAT_LIMIT);
    }
}
