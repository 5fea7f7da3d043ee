//! Expression elements recognized by the lexer.
//!
//! The infix grammar has two vocabularies. While an operand is expected the
//! lexer looks names up in [`OPERANDS`]; after an operand it uses
//! [`OPERATORS`]. Every element carries the priorities and stack effect the
//! compiler needs to place it in postfix order.

use crate::opcode::Opcode;

/// How the compiler treats an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// Pushes one value (fetches, constants, random numbers).
    Operand,
    /// A numeric literal, re-parsed from the source.
    LiteralOperand,
    /// A quoted string literal.
    StringOperand,
    /// A prefix function or operator, also `(`.
    UnaryOperator,
    /// A function taking a variable number of arguments.
    VarargOperator,
    /// An infix operator, also the `[` and `{` openers.
    BinaryOperator,
    /// `,`
    Separator,
    /// `)`
    CloseParen,
    /// `]`
    CloseBracket,
    /// `}`
    CloseCurly,
    /// `?` or `:`
    Conditional,
    /// `;`
    ExprTerminator,
    /// `:=`
    StoreOperator,
    /// `UNTIL`
    UntilOperator,
}

/// One entry of a lexical table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element {
    /// Source spelling, matched case-insensitively.
    pub name: &'static str,
    /// Priority while sitting on the operator stack.
    pub stack_priority: i8,
    /// Priority when arriving from the source.
    pub incoming_priority: i8,
    /// Net change in evaluation stack depth once emitted.
    pub effect: i8,
    /// Compiler treatment.
    pub kind: ElementKind,
    /// Opcode emitted for this element, if any.
    pub code: Option<Opcode>,
}

impl Element {
    /// Returns the bracket byte if this element opens a group.
    #[must_use]
    pub fn opener(&self) -> Option<u8> {
        match self.name.as_bytes() {
            [b @ (b'(' | b'[' | b'{')] => Some(*b),
            _ => None,
        }
    }
}

const fn el(
    name: &'static str,
    stack_priority: i8,
    incoming_priority: i8,
    effect: i8,
    kind: ElementKind,
    code: Option<Opcode>,
) -> Element {
    Element {
        name,
        stack_priority,
        incoming_priority,
        effect,
        kind,
        code,
    }
}

const fn operand(name: &'static str, code: Opcode) -> Element {
    el(name, 0, 0, 1, ElementKind::Operand, Some(code))
}

const fn literal(name: &'static str) -> Element {
    el(name, 0, 0, 1, ElementKind::LiteralOperand, Some(Opcode::LiteralDouble))
}

const fn unary(name: &'static str, code: Opcode) -> Element {
    el(name, 9, 10, 0, ElementKind::UnaryOperator, Some(code))
}

const fn dyadic(name: &'static str, code: Opcode) -> Element {
    el(name, 9, 10, -1, ElementKind::UnaryOperator, Some(code))
}

const fn vararg(name: &'static str, code: Opcode) -> Element {
    el(name, 9, 10, 0, ElementKind::VarargOperator, Some(code))
}

const fn binary(name: &'static str, priority: i8, code: Opcode) -> Element {
    el(name, priority, priority, -1, ElementKind::BinaryOperator, Some(code))
}

const fn marker(name: &'static str, kind: ElementKind) -> Element {
    el(name, 0, 0, 0, kind, None)
}

/// Elements recognized where an operand is expected.
pub static OPERANDS: &[Element] = &[
    el("\"", 0, 0, 1, ElementKind::StringOperand, Some(Opcode::LiteralString)),
    el("'", 0, 0, 1, ElementKind::StringOperand, Some(Opcode::LiteralString)),
    unary("@", Opcode::ArrayFetch),
    unary("@@", Opcode::ArrayFetchStr),
    unary("!", Opcode::RelNot),
    el("(", 0, 10, 0, ElementKind::UnaryOperator, None),
    unary("-", Opcode::Neg),
    literal("."),
    literal("0"),
    literal("1"),
    literal("2"),
    literal("3"),
    literal("4"),
    literal("5"),
    literal("6"),
    literal("7"),
    literal("8"),
    literal("9"),
    literal("INF"),
    literal("NAN"),
    operand("A", Opcode::Fetch(0)),
    operand("B", Opcode::Fetch(1)),
    operand("C", Opcode::Fetch(2)),
    operand("D", Opcode::Fetch(3)),
    operand("E", Opcode::Fetch(4)),
    operand("F", Opcode::Fetch(5)),
    operand("G", Opcode::Fetch(6)),
    operand("H", Opcode::Fetch(7)),
    operand("I", Opcode::Fetch(8)),
    operand("J", Opcode::Fetch(9)),
    operand("K", Opcode::Fetch(10)),
    operand("L", Opcode::Fetch(11)),
    operand("M", Opcode::Fetch(12)),
    operand("N", Opcode::Fetch(13)),
    operand("O", Opcode::Fetch(14)),
    operand("P", Opcode::Fetch(15)),
    operand("AA", Opcode::FetchStr(0)),
    operand("BB", Opcode::FetchStr(1)),
    operand("CC", Opcode::FetchStr(2)),
    operand("DD", Opcode::FetchStr(3)),
    operand("EE", Opcode::FetchStr(4)),
    operand("FF", Opcode::FetchStr(5)),
    operand("GG", Opcode::FetchStr(6)),
    operand("HH", Opcode::FetchStr(7)),
    operand("II", Opcode::FetchStr(8)),
    operand("JJ", Opcode::FetchStr(9)),
    operand("KK", Opcode::FetchStr(10)),
    operand("LL", Opcode::FetchStr(11)),
    operand("VAL", Opcode::FetchVal),
    operand("SVAL", Opcode::FetchSval),
    operand("PI", Opcode::ConstPi),
    operand("D2R", Opcode::ConstD2R),
    operand("R2D", Opcode::ConstR2D),
    operand("S2R", Opcode::ConstS2R),
    operand("R2S", Opcode::ConstR2S),
    operand("RNDM", Opcode::Random),
    operand("NRNDM", Opcode::NormalRandom),
    unary("ABS", Opcode::Abs),
    unary("ACOS", Opcode::Acos),
    unary("ASIN", Opcode::Asin),
    unary("ATAN", Opcode::Atan),
    dyadic("ATAN2", Opcode::Atan2),
    unary("BYTE", Opcode::Byte),
    unary("CEIL", Opcode::Ceil),
    unary("COS", Opcode::Cos),
    unary("COSH", Opcode::Cosh),
    unary("DBL", Opcode::ToDouble),
    unary("$E", Opcode::Esc),
    unary("ESC", Opcode::Esc),
    unary("EXP", Opcode::Exp),
    vararg("FINITE", Opcode::Finite),
    unary("FLOOR", Opcode::Floor),
    unary("INT", Opcode::Nint),
    unary("ISINF", Opcode::IsInf),
    vararg("ISNAN", Opcode::IsNan),
    unary("LN", Opcode::LogE),
    unary("LOG", Opcode::Log10),
    unary("LOGE", Opcode::LogE),
    vararg("MAX", Opcode::Max),
    vararg("MIN", Opcode::Min),
    unary("NINT", Opcode::Nint),
    unary("NOT", Opcode::BitNot),
    dyadic("$P", Opcode::Printf),
    dyadic("PRINTF", Opcode::Printf),
    dyadic("$R", Opcode::BinRead),
    dyadic("READ", Opcode::BinRead),
    unary("SIN", Opcode::Sin),
    unary("SINH", Opcode::Sinh),
    unary("SQR", Opcode::Sqrt),
    unary("SQRT", Opcode::Sqrt),
    dyadic("$S", Opcode::Sscanf),
    dyadic("SSCANF", Opcode::Sscanf),
    unary("STR", Opcode::ToString),
    unary("TAN", Opcode::Tan),
    unary("TANH", Opcode::Tanh),
    unary("$T", Opcode::TrEsc),
    unary("TR_ESC", Opcode::TrEsc),
    dyadic("$W", Opcode::BinWrite),
    dyadic("WRITE", Opcode::BinWrite),
    unary("CRC16", Opcode::Crc16),
    unary("MODBUS", Opcode::Modbus),
    unary("LRC", Opcode::Lrc),
    unary("AMODBUS", Opcode::AModbus),
    unary("XOR8", Opcode::Xor8),
    unary("ADD_XOR8", Opcode::AddXor8),
    unary("LEN", Opcode::Len),
    el("UNTIL", 0, 10, 0, ElementKind::UntilOperator, Some(Opcode::Until)),
    unary("~", Opcode::BitNot),
];

/// Elements recognized after an operand.
pub static OPERATORS: &[Element] = &[
    binary("!=", 5, Opcode::NotEq),
    binary("#", 5, Opcode::NotEq),
    binary("%", 7, Opcode::Mod),
    binary("&", 3, Opcode::BitAnd),
    binary("&&", 3, Opcode::RelAnd),
    marker(")", ElementKind::CloseParen),
    el("[", 0, 11, -1, ElementKind::BinaryOperator, Some(Opcode::Subrange)),
    el("{", 0, 11, -1, ElementKind::BinaryOperator, Some(Opcode::Replace)),
    marker("]", ElementKind::CloseBracket),
    marker("}", ElementKind::CloseCurly),
    binary("*", 7, Opcode::Mul),
    binary("**", 8, Opcode::Power),
    binary("+", 6, Opcode::Add),
    marker(",", ElementKind::Separator),
    binary("-", 6, Opcode::Sub),
    binary("/", 7, Opcode::Div),
    el(":", 0, 0, -1, ElementKind::Conditional, Some(Opcode::CondElse)),
    el(":=", 1, 0, -1, ElementKind::StoreOperator, Some(Opcode::Store(0))),
    marker(";", ElementKind::ExprTerminator),
    binary("<", 5, Opcode::Less),
    binary("<<", 3, Opcode::ShiftLeft),
    binary("<=", 5, Opcode::LessEq),
    binary("=", 5, Opcode::Equal),
    binary("==", 5, Opcode::Equal),
    binary(">", 5, Opcode::Greater),
    binary(">=", 5, Opcode::GreaterEq),
    binary(">>", 3, Opcode::ShiftRight),
    el("?", 0, 0, -1, ElementKind::Conditional, Some(Opcode::CondIf)),
    binary("AND", 3, Opcode::BitAnd),
    binary("OR", 2, Opcode::BitOr),
    binary("XOR", 2, Opcode::BitXor),
    binary("^", 8, Opcode::Power),
    binary("|", 2, Opcode::BitOr),
    binary("||", 2, Opcode::RelOr),
    binary("-|", 6, Opcode::Sub),
    binary("|-", 6, Opcode::SubLast),
    binary(">?", 4, Opcode::MaxVal),
    binary("<?", 4, Opcode::MinVal),
];

/// Finds the longest element of `table` that prefixes `input`, ignoring
/// ASCII case.
#[must_use]
pub fn lookup(table: &'static [Element], input: &[u8]) -> Option<&'static Element> {
    table
        .iter()
        .filter(|e| {
            let name = e.name.as_bytes();
            input.len() >= name.len() && input[..name.len()].eq_ignore_ascii_case(name)
        })
        .max_by_key(|e| e.name.len())
}
