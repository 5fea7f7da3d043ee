//! Bytecode instruction set for the sCalc interpreter.
//!
//! A compiled expression is a flat byte buffer: one type-tag byte, a run of
//! instructions, and a terminating [`Opcode::End`]. Most instructions are a
//! single byte; the literal loaders and the vararg functions carry an inline
//! payload. [`decode`] is the one place that knows those payload sizes.

#![allow(clippy::doc_markdown)]

use std::fmt;

use scalc_foundation::{Error, NUMERIC_ARGS, Result, STRING_ARGS};

/// Type tag: the expression never touches a string opcode.
pub const TAG_NO_STRING: u8 = 0xFE;

/// Type tag: the expression uses at least one string opcode.
pub const TAG_USES_STRING: u8 = 0xFF;

const FETCH_BASE: u8 = 6;
const FETCH_STR_BASE: u8 = FETCH_BASE + NUMERIC_ARGS as u8;
const STORE_BASE: u8 = FETCH_STR_BASE + STRING_ARGS as u8;
const STORE_STR_BASE: u8 = STORE_BASE + NUMERIC_ARGS as u8;
const SIMPLE_BASE: u8 = STORE_STR_BASE + STRING_ARGS as u8;

/// A single bytecode instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // === Framing ===
    /// End of expression.
    End,

    // === Literals and Fetches ===
    /// Push an 8-byte little-endian double payload.
    LiteralDouble,
    /// Push a 4-byte little-endian integer payload.
    LiteralInt,
    /// Push a NUL-terminated string payload.
    LiteralString,
    /// Push the previous numeric result.
    FetchVal,
    /// Push the previous string result.
    FetchSval,
    /// Push numeric argument `A`..`P` (index 0..16).
    Fetch(u8),
    /// Push string argument `AA`..`LL` (index 0..12).
    FetchStr(u8),
    /// Pop into numeric argument `A`..`P`.
    Store(u8),
    /// Pop into string argument `AA`..`LL`.
    StoreStr(u8),
    /// Indexed numeric fetch: `[i] -> [args[i]]`
    ArrayFetch,
    /// Indexed string fetch: `[i] -> [strings[i]]`
    ArrayFetchStr,
    /// Indexed numeric store: `[i, x] -> []`
    ArrayStore,
    /// Indexed string store: `[i, s] -> []`
    ArrayStoreStr,

    // === Constants ===
    /// Push pi.
    ConstPi,
    /// Push degrees-to-radians factor.
    ConstD2R,
    /// Push radians-to-degrees factor.
    ConstR2D,
    /// Push arc-seconds-to-radians factor.
    ConstS2R,
    /// Push radians-to-arc-seconds factor.
    ConstR2S,
    /// Push a uniform random number in (0, 1].
    Random,
    /// Push a standard normal random number.
    NormalRandom,

    // === Arithmetic ===
    /// Negate: `[a] -> [-a]`
    Neg,
    /// Add or concatenate: `[a, b] -> [a + b]`
    Add,
    /// Subtract or remove first occurrence: `[a, b] -> [a - b]`
    Sub,
    /// Remove last occurrence: `[a, b] -> [a |- b]`
    SubLast,
    /// Multiply: `[a, b] -> [a * b]`
    Mul,
    /// Divide: `[a, b] -> [a / b]`
    Div,
    /// Integer modulo: `[a, b] -> [a % b]`
    Mod,
    /// Power: `[a, b] -> [a ^ b]`
    Power,

    // === Math Functions ===
    /// Absolute value.
    Abs,
    /// Exponential.
    Exp,
    /// Base-10 logarithm.
    Log10,
    /// Natural logarithm.
    LogE,
    /// Square root.
    Sqrt,
    /// Arc cosine.
    Acos,
    /// Arc sine.
    Asin,
    /// Arc tangent.
    Atan,
    /// Two-argument arc tangent: `[a, b] -> [atan2(b, a)]`
    Atan2,
    /// Cosine.
    Cos,
    /// Hyperbolic cosine.
    Cosh,
    /// Sine.
    Sin,
    /// Hyperbolic sine.
    Sinh,
    /// Tangent.
    Tan,
    /// Hyperbolic tangent.
    Tanh,
    /// Ceiling.
    Ceil,
    /// Floor.
    Floor,
    /// Round half away from zero.
    Nint,

    // === Predicates and Selection ===
    /// Vararg: true if every operand is finite.
    Finite,
    /// True if the operand is infinite.
    IsInf,
    /// Vararg: true if any operand is NaN.
    IsNan,
    /// Vararg maximum.
    Max,
    /// Vararg minimum.
    Min,
    /// Binary maximum: `[a, b] -> [a >? b]`
    MaxVal,
    /// Binary minimum: `[a, b] -> [a <? b]`
    MinVal,

    // === Logic ===
    /// Logical or.
    RelOr,
    /// Logical and.
    RelAnd,
    /// Logical not.
    RelNot,

    // === Bitwise ===
    /// Bitwise or.
    BitOr,
    /// Bitwise and.
    BitAnd,
    /// Bitwise exclusive or.
    BitXor,
    /// Bitwise complement.
    BitNot,
    /// Right shift (characters, for strings).
    ShiftRight,
    /// Left shift (characters, for strings).
    ShiftLeft,

    // === Comparison ===
    /// Not equal.
    NotEq,
    /// Less than.
    Less,
    /// Less than or equal.
    LessEq,
    /// Equal.
    Equal,
    /// Greater than or equal.
    GreaterEq,
    /// Greater than.
    Greater,

    // === Control Flow ===
    /// Pop a condition; when false skip past the matching `CondElse`.
    CondIf,
    /// Skip past the matching `CondEnd`.
    CondElse,
    /// Marks the end of a conditional.
    CondEnd,
    /// Loop head: records the resume point.
    Until,
    /// Loop tail: rewinds to the loop head while the top of stack is zero.
    UntilEnd,

    // === Strings ===
    /// Convert to number, hunting for an embedded numeral.
    ToDouble,
    /// Convert to string.
    ToString,
    /// String length.
    Len,
    /// First byte as a number.
    Byte,
    /// Format one value: `[fmt, x] -> [s]`
    Printf,
    /// Scan one value: `[input, fmt] -> [x]`
    Sscanf,
    /// Unpack one binary scalar: `[input, fmt] -> [x]`
    BinRead,
    /// Pack one binary scalar: `[fmt, x] -> [s]`
    BinWrite,
    /// Substring: `[s, i, j] -> [s[i..=j]]`
    Subrange,
    /// Replace first occurrence: `[s, old, new] -> [s']`
    Replace,
    /// Translate C escape sequences.
    TrEsc,
    /// Escape non-printable bytes.
    Esc,

    // === Checksums ===
    /// Replace with the escaped CRC-16/MODBUS.
    Crc16,
    /// Append the escaped CRC-16/MODBUS.
    Modbus,
    /// Replace with the ASCII-hex LRC.
    Lrc,
    /// Frame as ASCII Modbus: `:` + s + LRC.
    AModbus,
    /// Replace with the escaped XOR-8 checksum.
    Xor8,
    /// Append the escaped XOR-8 checksum.
    AddXor8,
}

/// Opcodes numbered sequentially from `SIMPLE_BASE`.
const SIMPLE: [Opcode; 82] = [
    Opcode::ArrayFetch,
    Opcode::ArrayFetchStr,
    Opcode::ArrayStore,
    Opcode::ArrayStoreStr,
    Opcode::ConstPi,
    Opcode::ConstD2R,
    Opcode::ConstR2D,
    Opcode::ConstS2R,
    Opcode::ConstR2S,
    Opcode::Random,
    Opcode::NormalRandom,
    Opcode::Neg,
    Opcode::Add,
    Opcode::Sub,
    Opcode::SubLast,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::Power,
    Opcode::Abs,
    Opcode::Exp,
    Opcode::Log10,
    Opcode::LogE,
    Opcode::Sqrt,
    Opcode::Acos,
    Opcode::Asin,
    Opcode::Atan,
    Opcode::Atan2,
    Opcode::Cos,
    Opcode::Cosh,
    Opcode::Sin,
    Opcode::Sinh,
    Opcode::Tan,
    Opcode::Tanh,
    Opcode::Ceil,
    Opcode::Floor,
    Opcode::Nint,
    Opcode::Finite,
    Opcode::IsInf,
    Opcode::IsNan,
    Opcode::Max,
    Opcode::Min,
    Opcode::MaxVal,
    Opcode::MinVal,
    Opcode::RelOr,
    Opcode::RelAnd,
    Opcode::RelNot,
    Opcode::BitOr,
    Opcode::BitAnd,
    Opcode::BitXor,
    Opcode::BitNot,
    Opcode::ShiftRight,
    Opcode::ShiftLeft,
    Opcode::NotEq,
    Opcode::Less,
    Opcode::LessEq,
    Opcode::Equal,
    Opcode::GreaterEq,
    Opcode::Greater,
    Opcode::CondIf,
    Opcode::CondElse,
    Opcode::CondEnd,
    Opcode::Until,
    Opcode::UntilEnd,
    Opcode::ToDouble,
    Opcode::ToString,
    Opcode::Len,
    Opcode::Byte,
    Opcode::Printf,
    Opcode::Sscanf,
    Opcode::BinRead,
    Opcode::BinWrite,
    Opcode::Subrange,
    Opcode::Replace,
    Opcode::TrEsc,
    Opcode::Esc,
    Opcode::Crc16,
    Opcode::Modbus,
    Opcode::Lrc,
    Opcode::AModbus,
    Opcode::Xor8,
    Opcode::AddXor8,
];

impl Opcode {
    /// Returns the byte this opcode is encoded as.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::End => 0,
            Self::LiteralDouble => 1,
            Self::LiteralInt => 2,
            Self::LiteralString => 3,
            Self::FetchVal => 4,
            Self::FetchSval => 5,
            Self::Fetch(i) => FETCH_BASE + i.min(NUMERIC_ARGS as u8 - 1),
            Self::FetchStr(i) => FETCH_STR_BASE + i.min(STRING_ARGS as u8 - 1),
            Self::Store(i) => STORE_BASE + i.min(NUMERIC_ARGS as u8 - 1),
            Self::StoreStr(i) => STORE_STR_BASE + i.min(STRING_ARGS as u8 - 1),
            other => SIMPLE
                .iter()
                .position(|&op| op == other)
                .map_or(0, |i| SIMPLE_BASE + i as u8),
        }
    }

    /// Decodes an opcode byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::End,
            1 => Self::LiteralDouble,
            2 => Self::LiteralInt,
            3 => Self::LiteralString,
            4 => Self::FetchVal,
            5 => Self::FetchSval,
            b if b < FETCH_STR_BASE => Self::Fetch(b - FETCH_BASE),
            b if b < STORE_BASE => Self::FetchStr(b - FETCH_STR_BASE),
            b if b < STORE_STR_BASE => Self::Store(b - STORE_BASE),
            b if b < SIMPLE_BASE => Self::StoreStr(b - STORE_STR_BASE),
            b => return SIMPLE.get(usize::from(b - SIMPLE_BASE)).copied(),
        })
    }

    /// Returns true for the functions followed by an argument-count byte.
    #[must_use]
    pub const fn is_vararg(self) -> bool {
        matches!(self, Self::Max | Self::Min | Self::Finite | Self::IsNan)
    }

    /// Returns true if the presence of this opcode makes an expression
    /// string-capable.
    #[must_use]
    pub const fn uses_string(self) -> bool {
        matches!(
            self,
            Self::FetchStr(_)
                | Self::FetchSval
                | Self::ToString
                | Self::Printf
                | Self::BinWrite
                | Self::Sscanf
                | Self::BinRead
                | Self::LiteralString
                | Self::Subrange
                | Self::Replace
                | Self::ArrayFetchStr
                | Self::TrEsc
                | Self::Esc
                | Self::Crc16
                | Self::Modbus
                | Self::Lrc
                | Self::AModbus
                | Self::Xor8
                | Self::AddXor8
                | Self::Len
        )
    }

    /// Returns the mnemonic for opcodes without a letter operand.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::End => "END",
            Self::LiteralDouble => "LITERAL_DOUBLE",
            Self::LiteralInt => "LITERAL_INT",
            Self::LiteralString => "LITERAL_STRING",
            Self::FetchVal => "VAL",
            Self::FetchSval => "SVAL",
            Self::Fetch(_) | Self::FetchStr(_) => "FETCH",
            Self::Store(_) | Self::StoreStr(_) => "STORE",
            Self::ArrayFetch => "A_FETCH",
            Self::ArrayFetchStr => "A_SFETCH",
            Self::ArrayStore => "A_STORE",
            Self::ArrayStoreStr => "A_SSTORE",
            Self::ConstPi => "CONST_PI",
            Self::ConstD2R => "CONST_D2R",
            Self::ConstR2D => "CONST_R2D",
            Self::ConstS2R => "CONST_S2R",
            Self::ConstR2S => "CONST_R2S",
            Self::Random => "RANDOM",
            Self::NormalRandom => "NORMAL_RNDM",
            Self::Neg => "UNARY_NEG",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::SubLast => "SUBLAST",
            Self::Mul => "MULT",
            Self::Div => "DIV",
            Self::Mod => "MODULO",
            Self::Power => "POWER",
            Self::Abs => "ABS_VAL",
            Self::Exp => "EXP",
            Self::Log10 => "LOG_10",
            Self::LogE => "LOG_E",
            Self::Sqrt => "SQU_RT",
            Self::Acos => "ACOS",
            Self::Asin => "ASIN",
            Self::Atan => "ATAN",
            Self::Atan2 => "ATAN2",
            Self::Cos => "COS",
            Self::Cosh => "COSH",
            Self::Sin => "SIN",
            Self::Sinh => "SINH",
            Self::Tan => "TAN",
            Self::Tanh => "TANH",
            Self::Ceil => "CEIL",
            Self::Floor => "FLOOR",
            Self::Nint => "NINT",
            Self::Finite => "FINITE",
            Self::IsInf => "ISINF",
            Self::IsNan => "ISNAN",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::MaxVal => "MAX_VAL",
            Self::MinVal => "MIN_VAL",
            Self::RelOr => "REL_OR",
            Self::RelAnd => "REL_AND",
            Self::RelNot => "REL_NOT",
            Self::BitOr => "BIT_OR",
            Self::BitAnd => "BIT_AND",
            Self::BitXor => "BIT_EXCL_OR",
            Self::BitNot => "BIT_NOT",
            Self::ShiftRight => "RIGHT_SHIFT",
            Self::ShiftLeft => "LEFT_SHIFT",
            Self::NotEq => "NOT_EQ",
            Self::Less => "LESS_THAN",
            Self::LessEq => "LESS_OR_EQ",
            Self::Equal => "EQUAL",
            Self::GreaterEq => "GR_OR_EQ",
            Self::Greater => "GR_THAN",
            Self::CondIf => "COND_IF",
            Self::CondElse => "COND_ELSE",
            Self::CondEnd => "COND_END",
            Self::Until => "UNTIL",
            Self::UntilEnd => "UNTIL_END",
            Self::ToDouble => "TO_DOUBLE",
            Self::ToString => "TO_STRING",
            Self::Len => "LEN",
            Self::Byte => "BYTE",
            Self::Printf => "PRINTF",
            Self::Sscanf => "SSCANF",
            Self::BinRead => "BIN_READ",
            Self::BinWrite => "BIN_WRITE",
            Self::Subrange => "SUBRANGE",
            Self::Replace => "REPLACE",
            Self::TrEsc => "TR_ESC",
            Self::Esc => "ESC",
            Self::Crc16 => "CRC16",
            Self::Modbus => "MODBUS",
            Self::Lrc => "LRC",
            Self::AModbus => "AMODBUS",
            Self::Xor8 => "XOR8",
            Self::AddXor8 => "ADD_XOR8",
        }
    }
}

/// Returns the register name for a numeric (`A`) or string (`AA`) slot.
#[must_use]
pub fn register_name(index: u8, string: bool) -> String {
    let letter = char::from(b'A' + index);
    if string {
        format!("{letter}{letter}")
    } else {
        letter.to_string()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fetch(i) => write!(f, "FETCH_{}", register_name(i, false)),
            Self::FetchStr(i) => write!(f, "FETCH_{}", register_name(i, true)),
            Self::Store(i) => write!(f, "STORE_{}", register_name(i, false)),
            Self::StoreStr(i) => write!(f, "STORE_{}", register_name(i, true)),
            other => f.write_str(other.mnemonic()),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Inline payload of an instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand<'a> {
    /// No payload.
    None,
    /// `LITERAL_DOUBLE` payload.
    Double(f64),
    /// `LITERAL_INT` payload.
    Int(i32),
    /// `LITERAL_STRING` payload, without the terminator.
    Str(&'a [u8]),
    /// Argument count of a vararg function.
    ArgCount(u8),
}

/// One decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction<'a> {
    /// Offset of the opcode byte in the buffer.
    pub offset: usize,
    /// The opcode.
    pub op: Opcode,
    /// Its inline payload.
    pub operand: Operand<'a>,
}

/// Decodes the instruction at `offset`, returning it and the offset of the
/// next instruction.
///
/// # Errors
///
/// Returns a malformed-bytecode error for unknown opcode bytes and for
/// payloads that run past the end of the buffer.
pub fn decode(code: &[u8], offset: usize) -> Result<(Instruction<'_>, usize)> {
    let byte = *code.get(offset).ok_or_else(|| Error::malformed(offset))?;
    let op = Opcode::from_byte(byte).ok_or_else(|| Error::malformed(offset))?;
    let body = offset + 1;
    let payload = |len: usize| code.get(body..body + len).ok_or_else(|| Error::malformed(offset));

    let (operand, next) = match op {
        Opcode::LiteralDouble => {
            let bytes = payload(8)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            (Operand::Double(f64::from_le_bytes(raw)), body + 8)
        }
        Opcode::LiteralInt => {
            let bytes = payload(4)?;
            let mut raw = [0u8; 4];
            raw.copy_from_slice(bytes);
            (Operand::Int(i32::from_le_bytes(raw)), body + 4)
        }
        Opcode::LiteralString => {
            let rest = code.get(body..).ok_or_else(|| Error::malformed(offset))?;
            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::malformed(offset))?;
            (Operand::Str(&rest[..nul]), body + nul + 1)
        }
        op if op.is_vararg() => (Operand::ArgCount(payload(1)?[0]), body + 1),
        _ => (Operand::None, body),
    };

    Ok((Instruction { offset, op, operand }, next))
}

/// A compiled expression.
#[derive(Clone, PartialEq, Eq)]
pub struct Bytecode {
    bytes: Vec<u8>,
}

impl Bytecode {
    /// Wraps a raw buffer, such as one filled by `compile_into`.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the buffer length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the buffer holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.len() < 2 || self.bytes[0] == 0
    }

    /// Returns true if the expression uses string opcodes.
    #[must_use]
    pub fn uses_string(&self) -> bool {
        self.bytes.first() == Some(&TAG_USES_STRING)
    }

    /// Iterates over the instructions after the type tag, stopping after
    /// `END` or at the first decoding error.
    #[must_use]
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.bytes)
    }
}

impl fmt::Debug for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bytecode")
            .field("uses_string", &self.uses_string())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// Iterator over the instructions of a buffer.
pub struct Instructions<'a> {
    code: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Instructions<'a> {
    /// Starts iterating after the type tag of `code`.
    #[must_use]
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            offset: 1,
            done: code.len() < 2,
        }
    }

    /// Starts iterating at an arbitrary offset.
    #[must_use]
    pub fn at(code: &'a [u8], offset: usize) -> Self {
        Self {
            code,
            offset,
            done: false,
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode(self.code, self.offset) {
            Ok((inst, next)) => {
                self.offset = next;
                self.done = inst.op == Opcode::End;
                Some(Ok(inst))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn every_opcode() -> Vec<Opcode> {
        let mut all = vec![
            Opcode::End,
            Opcode::LiteralDouble,
            Opcode::LiteralInt,
            Opcode::LiteralString,
            Opcode::FetchVal,
            Opcode::FetchSval,
        ];
        for i in 0..NUMERIC_ARGS as u8 {
            all.push(Opcode::Fetch(i));
            all.push(Opcode::Store(i));
        }
        for i in 0..STRING_ARGS as u8 {
            all.push(Opcode::FetchStr(i));
            all.push(Opcode::StoreStr(i));
        }
        all.extend(SIMPLE);
        all
    }

    #[test]
    fn opcode_bytes_are_unique_and_decode_back() {
        let mut seen = std::collections::HashSet::new();
        for op in every_opcode() {
            let byte = op.to_byte();
            assert!(seen.insert(byte), "duplicate byte {byte} for {op}");
            assert_eq!(Opcode::from_byte(byte), Some(op));
            assert_ne!(byte, TAG_NO_STRING);
            assert_ne!(byte, TAG_USES_STRING);
        }
    }

    #[test]
    fn unknown_bytes_do_not_decode() {
        assert_eq!(Opcode::from_byte(SIMPLE_BASE + SIMPLE.len() as u8), None);
        assert_eq!(Opcode::from_byte(TAG_USES_STRING), None);
    }

    #[test]
    fn letter_opcodes_display_register_names() {
        assert_eq!(Opcode::Fetch(0).to_string(), "FETCH_A");
        assert_eq!(Opcode::FetchStr(11).to_string(), "FETCH_LL");
        assert_eq!(Opcode::Store(15).to_string(), "STORE_P");
        assert_eq!(Opcode::Mul.to_string(), "MULT");
    }

    #[test]
    fn decode_reads_payloads() {
        let mut code = vec![TAG_NO_STRING, Opcode::LiteralInt.to_byte()];
        code.extend(7i32.to_le_bytes());
        code.push(Opcode::Max.to_byte());
        code.push(3);
        code.push(Opcode::LiteralString.to_byte());
        code.extend(b"hi\0");
        code.push(Opcode::End.to_byte());

        let ops: Vec<_> = Instructions::new(&code).map(|r| r.unwrap()).collect();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].operand, Operand::Int(7));
        assert_eq!(ops[1].operand, Operand::ArgCount(3));
        assert_eq!(ops[2].operand, Operand::Str(b"hi"));
        assert_eq!(ops[3].op, Opcode::End);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let code = [TAG_NO_STRING, Opcode::LiteralDouble.to_byte(), 0, 0];
        assert!(decode(&code, 1).is_err());
        let code = [TAG_USES_STRING, Opcode::LiteralString.to_byte(), b'x'];
        assert!(decode(&code, 1).is_err());
    }
}
