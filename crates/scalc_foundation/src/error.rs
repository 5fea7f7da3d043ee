//! Error types for the sCalc system.
//!
//! Uses `thiserror` for ergonomic error definition. Compile errors keep the
//! stable numeric codes callers have always branched on; evaluation errors
//! are a single failure signal enriched with a sub-kind.

use std::fmt;

use thiserror::Error;

/// The main error type for sCalc operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

/// Result alias used throughout sCalc.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a compile error at the given byte offset of the source.
    #[must_use]
    pub fn compile(kind: CompileErrorKind, position: usize) -> Self {
        Self::new(ErrorKind::Compile { kind, position })
    }

    /// Creates an evaluation failure.
    #[must_use]
    pub fn eval(kind: EvalErrorKind) -> Self {
        Self::new(ErrorKind::Eval(kind))
    }

    /// Creates an evaluation failure for malformed bytecode at `offset`.
    #[must_use]
    pub fn malformed(offset: usize) -> Self {
        Self::eval(EvalErrorKind::MalformedBytecode { offset })
    }

    /// Returns the compile error kind, if this is a compile error.
    #[must_use]
    pub fn compile_kind(&self) -> Option<CompileErrorKind> {
        match self.kind {
            ErrorKind::Compile { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Returns the evaluation error kind, if this is an evaluation failure.
    #[must_use]
    pub fn eval_kind(&self) -> Option<&EvalErrorKind> {
        match &self.kind {
            ErrorKind::Eval(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns the legacy status code: the compile error code for compile
    /// errors, `-1` for everything else.
    #[must_use]
    pub fn status(&self) -> i16 {
        self.compile_kind().map_or(-1, CompileErrorKind::code)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The expression could not be compiled.
    #[error("{kind} (at offset {position})")]
    Compile {
        /// What went wrong.
        kind: CompileErrorKind,
        /// Byte offset into the source where compilation stopped.
        position: usize,
    },

    /// Evaluation of compiled bytecode failed.
    #[error("evaluation failed: {0}")]
    Eval(EvalErrorKind),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Compile-time error kinds, with stable numeric codes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    /// Success placeholder (code 0).
    #[error("No error")]
    None,
    /// Code 1.
    #[error("Too many results returned")]
    TooMany,
    /// Code 2.
    #[error("Badly formed numeric literal")]
    BadLiteral,
    /// Code 3.
    #[error("Bad assignment target")]
    BadAssignment,
    /// Code 4.
    #[error("Comma without enclosing parentheses")]
    BadSeparator,
    /// Code 5.
    #[error("Close parenthesis found without open")]
    ParenNotOpen,
    /// Code 6.
    #[error("Parenthesis still open at end of expression")]
    ParenOpen,
    /// Code 7.
    #[error("Unbalanced conditional ?: operators")]
    Conditional,
    /// Code 8.
    #[error("Incomplete expression, operand missing")]
    Incomplete,
    /// Code 9.
    #[error("Not enough operands provided")]
    Underflow,
    /// Code 10.
    #[error("Runtime stack would overflow")]
    Overflow,
    /// Code 11.
    #[error("Syntax error, unknown operator/operand")]
    Syntax,
    /// Code 12.
    #[error("NULL or empty input argument to postfix()")]
    NullArg,
    /// Code 13.
    #[error("Internal error, unknown element type")]
    Internal,
    /// Code 14.
    #[error("Close bracket without open")]
    BracketNotOpen,
    /// Code 15.
    #[error("Close curly bracket without open")]
    CurlyNotOpen,
    /// Code 16: the caller's output buffer cannot hold the bytecode.
    #[error("Output buffer too small")]
    BufferTooSmall,
}

impl CompileErrorKind {
    const ALL: [Self; 17] = [
        Self::None,
        Self::TooMany,
        Self::BadLiteral,
        Self::BadAssignment,
        Self::BadSeparator,
        Self::ParenNotOpen,
        Self::ParenOpen,
        Self::Conditional,
        Self::Incomplete,
        Self::Underflow,
        Self::Overflow,
        Self::Syntax,
        Self::NullArg,
        Self::Internal,
        Self::BracketNotOpen,
        Self::CurlyNotOpen,
        Self::BufferTooSmall,
    ];

    /// Returns the stable numeric code of this error kind.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::None => 0,
            Self::TooMany => 1,
            Self::BadLiteral => 2,
            Self::BadAssignment => 3,
            Self::BadSeparator => 4,
            Self::ParenNotOpen => 5,
            Self::ParenOpen => 6,
            Self::Conditional => 7,
            Self::Incomplete => 8,
            Self::Underflow => 9,
            Self::Overflow => 10,
            Self::Syntax => 11,
            Self::NullArg => 12,
            Self::Internal => 13,
            Self::BracketNotOpen => 14,
            Self::CurlyNotOpen => 15,
            Self::BufferTooSmall => 16,
        }
    }

    /// Looks up the kind with the given numeric code.
    #[must_use]
    pub fn from_code(code: i16) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

/// Returns the human-readable message for a compile error code.
#[must_use]
pub fn error_message(code: i16) -> Option<&'static str> {
    CompileErrorKind::from_code(code).map(|kind| match kind {
        CompileErrorKind::None => "No error",
        CompileErrorKind::TooMany => "Too many results returned",
        CompileErrorKind::BadLiteral => "Badly formed numeric literal",
        CompileErrorKind::BadAssignment => "Bad assignment target",
        CompileErrorKind::BadSeparator => "Comma without enclosing parentheses",
        CompileErrorKind::ParenNotOpen => "Close parenthesis found without open",
        CompileErrorKind::ParenOpen => "Parenthesis still open at end of expression",
        CompileErrorKind::Conditional => "Unbalanced conditional ?: operators",
        CompileErrorKind::Incomplete => "Incomplete expression, operand missing",
        CompileErrorKind::Underflow => "Not enough operands provided",
        CompileErrorKind::Overflow => "Runtime stack would overflow",
        CompileErrorKind::Syntax => "Syntax error, unknown operator/operand",
        CompileErrorKind::NullArg => "NULL or empty input argument to postfix()",
        CompileErrorKind::Internal => "Internal error, unknown element type",
        CompileErrorKind::BracketNotOpen => "Close bracket without open",
        CompileErrorKind::CurlyNotOpen => "Close curly bracket without open",
        CompileErrorKind::BufferTooSmall => "Output buffer too small",
    })
}

/// Why an evaluation failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalErrorKind {
    /// `/` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// `%` with a divisor that truncates to zero.
    #[error("modulo by zero")]
    ModuloByZero,

    /// A math function was applied outside its domain.
    #[error("domain error in {op}")]
    Domain {
        /// The offending operation.
        op: &'static str,
    },

    /// A push would exceed the fixed evaluation stack.
    #[error("evaluation stack overflow")]
    StackOverflow,

    /// A pop found the evaluation stack empty.
    #[error("evaluation stack underflow")]
    StackUnderflow,

    /// Evaluation finished with other than one value on the stack.
    #[error("stack unbalanced at end of expression ({depth} values)")]
    Unbalanced {
        /// Number of values left on the stack.
        depth: usize,
    },

    /// A format string was not usable by a formatting builtin.
    #[error("bad format string for {op}: {reason}")]
    BadFormat {
        /// The builtin that rejected the format.
        op: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A builtin needed a string operand and got a number.
    #[error("{op} requires a string operand")]
    NotAString {
        /// The builtin that rejected the operand.
        op: &'static str,
    },

    /// A scan or binary read did not produce exactly one value.
    #[error("{op} conversion failed")]
    ConversionFailed {
        /// The builtin whose conversion failed.
        op: &'static str,
    },

    /// More `UNTIL` markers than the loop table can hold.
    #[error("more than {limit} UNTIL loops in one expression")]
    TooManyLoops {
        /// Loop table capacity.
        limit: usize,
    },

    /// An `UNTIL` or `UNTIL_END` marker without its partner.
    #[error("unmatched loop marker at offset {offset}")]
    UnmatchedLoop {
        /// Bytecode offset of the marker.
        offset: usize,
    },

    /// The shared iteration budget for `UNTIL` loops ran out.
    #[error("loop limit ({limit}) exceeded")]
    LoopLimit {
        /// The configured budget.
        limit: u32,
    },

    /// A conditional branch has no matching `COND_ELSE`/`COND_END`.
    #[error("unmatched conditional at offset {offset}")]
    UnmatchedConditional {
        /// Bytecode offset of the branch.
        offset: usize,
    },

    /// The final result is NaN or infinite.
    #[error("result is not finite: {0}")]
    NonFinite(f64),

    /// The bytecode buffer could not be decoded.
    #[error("malformed bytecode at offset {offset}")]
    MalformedBytecode {
        /// Offset of the undecodable byte.
        offset: usize,
    },

    /// The bytecode holds no instructions.
    #[error("empty expression")]
    EmptyExpression,
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The expression text being compiled or evaluated.
    pub expression: Option<String>,
    /// Byte offset into the expression.
    pub position: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expression text.
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Sets the byte offset.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(expression) = &self.expression {
            writeln!(f, "  {expression}")?;
            if let Some(position) = self.position {
                let caret = expression
                    .char_indices()
                    .take_while(|(i, _)| *i < position)
                    .count();
                write!(f, "  {:caret$}^", "")?;
            }
        }
        Ok(())
    }
}
