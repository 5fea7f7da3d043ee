//! Serial-protocol checksums: CRC-16/MODBUS, ASCII-hex LRC, and XOR8.
//!
//! CRC and XOR work on the escape-translated bytes of a string and render
//! their result as `\xNN` escapes so it can be spliced back into text.

use std::fmt::Write;

use scalc_foundation::numeric::{ScratchBuf, hex_value};
use scalc_foundation::{FixedString, Value};

use super::escape::translate_escapes;
use super::{FORMAT_LIMIT, Scratch};

const POLYNOMIAL: u16 = 0xa001;

/// CRC-16/MODBUS: reflected polynomial 0xA001, initial value 0xFFFF.
#[must_use]
pub(crate) fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0xffff, |crc, &byte| {
        (0..8).fold(crc ^ u16::from(byte), |crc, _| {
            if crc & 1 == 0 {
                crc >> 1
            } else {
                (crc >> 1) ^ POLYNOMIAL
            }
        })
    })
}

/// Longitudinal redundancy check over ASCII-hex digit pairs.
///
/// An odd trailing digit is ignored and non-hex characters count as 0.
#[must_use]
pub(crate) fn lrc(hex: &[u8]) -> u8 {
    hex.chunks_exact(2)
        .fold(0u8, |sum, pair| {
            let high = hex_value(pair[0]).unwrap_or(0);
            let low = hex_value(pair[1]).unwrap_or(0);
            sum.wrapping_add((high << 4) | low)
        })
        .wrapping_neg()
}

/// XOR of all bytes.
#[must_use]
pub(crate) fn xor8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

fn translated(s: &FixedString) -> Scratch {
    let mut raw = Scratch::new();
    translate_escapes(s.as_bytes(), &mut raw);
    raw
}

fn splice(s: &mut FixedString, rendered: &[u8], append: bool) {
    if append {
        s.push_bytes(rendered);
    } else {
        *s = FixedString::from_bytes_limited(rendered, FORMAT_LIMIT);
    }
}

/// `CRC16` (replace) and `MODBUS` (append).
pub(crate) fn crc16_op(value: &mut Value, append: bool) {
    let Value::Text(s) = value else { return };
    let raw = translated(s);
    if raw.is_empty() {
        return;
    }
    let [low, high] = crc16(raw.as_bytes()).to_le_bytes();
    let mut rendered = ScratchBuf::<16>::new();
    let _ = write!(rendered, "\\x{low:02x}\\x{high:02x}");
    splice(s, rendered.as_bytes(), append);
}

/// `LRC` (replace) and `AMODBUS` (`:` + input + LRC).
pub(crate) fn lrc_op(value: &mut Value, framed: bool) {
    let Value::Text(s) = value else { return };
    let mut rendered = ScratchBuf::<4>::new();
    let _ = write!(rendered, "{:02X}", lrc(s.as_bytes()));
    if framed {
        let mut frame = FixedString::from(":");
        frame.push_bytes(s.as_bytes());
        frame.push_bytes(rendered.as_bytes());
        *s = frame;
    } else {
        splice(s, rendered.as_bytes(), false);
    }
}

/// `XOR8` (replace) and `ADD_XOR8` (append).
pub(crate) fn xor8_op(value: &mut Value, append: bool) {
    let Value::Text(s) = value else { return };
    let raw = translated(s);
    if raw.is_empty() {
        return;
    }
    let mut rendered = ScratchBuf::<8>::new();
    let _ = write!(rendered, "\\x{:02x}", xor8(raw.as_bytes()));
    splice(s, rendered.as_bytes(), append);
}
