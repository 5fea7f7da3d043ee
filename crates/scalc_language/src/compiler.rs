//! Infix to postfix compiler.
//!
//! A Shunting-Yard translator driven by the element tables in
//! [`crate::token`]. Operators wait on a bounded operator stack until an
//! element of lower priority arrives; operands go straight to the output.
//! The compiler also tracks the evaluation stack depth symbolically so that
//! expressions which would underflow or overflow the interpreter stack are
//! rejected before they run.

#![allow(clippy::cast_possible_truncation)]

use scalc_foundation::{CompileErrorKind, Error, ErrorContext, ErrorKind, Result, STACK_SIZE};
use tracing::debug;

use crate::lexer::Lexer;
use crate::opcode::{Bytecode, Opcode, TAG_NO_STRING, TAG_USES_STRING};
use crate::token::{Element, ElementKind};

/// Capacity of the compile-time operator stack.
pub const OPERATOR_STACK_SIZE: usize = 80;

/// The documented output buffer size for an `n`-byte expression.
///
/// Expressions dominated by short fractional literals (`.5`) can need more;
/// [`compile_into`] reports [`CompileErrorKind::BufferTooSmall`] instead of
/// writing past the end.
#[must_use]
pub const fn postfix_capacity(source_len: usize) -> usize {
    2 + 21 * source_len / 6
}

/// Output size that holds the bytecode of any `n`-byte expression: every
/// two source bytes produce at most one 9-byte double literal.
const fn worst_case_capacity(source_len: usize) -> usize {
    2 + 9 * source_len.div_ceil(2)
}

/// Compiles an infix expression.
///
/// # Errors
///
/// Returns a compile error carrying the failing [`CompileErrorKind`], the
/// byte offset where compilation stopped, and the expression text.
pub fn compile(source: &str) -> Result<Bytecode> {
    compile_bytes(source.as_bytes())
}

/// Compiles an infix expression given as raw bytes. Input ends at the first
/// NUL, if any.
///
/// # Errors
///
/// See [`compile`].
pub fn compile_bytes(source: &[u8]) -> Result<Bytecode> {
    let mut buf = vec![0u8; worst_case_capacity(source.len())];
    let len = compile_into(source, &mut buf)?;
    buf.truncate(len);
    Ok(Bytecode::from_bytes(buf))
}

/// Compiles into a caller-supplied buffer and returns the number of bytes
/// written.
///
/// On failure the buffer holds a single `END` byte, so it is never mistaken
/// for a runnable expression.
///
/// # Errors
///
/// See [`compile`]. An output buffer too small for the bytecode yields
/// [`CompileErrorKind::BufferTooSmall`].
pub fn compile_into(source: &[u8], out: &mut [u8]) -> Result<usize> {
    let result = Compiler::new(source, out).run();
    match result {
        Ok(len) => {
            debug!(target: "scalc::compile", bytes = len, "compiled expression");
            Ok(len)
        }
        Err(e) => {
            if let Some(first) = out.first_mut() {
                *first = Opcode::End.to_byte();
            }
            debug!(target: "scalc::compile", error = %e, "compile failed");
            let position = match e.kind {
                ErrorKind::Compile { position, .. } => position,
                _ => 0,
            };
            Err(e.with_context(
                ErrorContext::new()
                    .with_expression(String::from_utf8_lossy(source).into_owned())
                    .with_position(position),
            ))
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Bounded writer over the output buffer.
struct Postfix<'out> {
    buf: &'out mut [u8],
    len: usize,
    /// The most recently emitted instruction and its offset.
    last: Option<(Opcode, usize)>,
}

impl<'out> Postfix<'out> {
    fn new(buf: &'out mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            last: None,
        }
    }

    fn byte(&mut self, byte: u8) -> std::result::Result<(), CompileErrorKind> {
        let slot = self
            .buf
            .get_mut(self.len)
            .ok_or(CompileErrorKind::BufferTooSmall)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    fn bytes(&mut self, bytes: &[u8]) -> std::result::Result<(), CompileErrorKind> {
        bytes.iter().try_for_each(|&b| self.byte(b))
    }

    fn op(&mut self, op: Opcode) -> std::result::Result<(), CompileErrorKind> {
        self.last = Some((op, self.len));
        self.byte(op.to_byte())
    }

    fn mark_uses_string(&mut self) {
        if let Some(tag) = self.buf.first_mut() {
            *tag = TAG_USES_STRING;
        }
    }

    /// Removes the last instruction if it is a letter fetch and returns it.
    fn retract_fetch(&mut self) -> Option<Opcode> {
        match self.last {
            Some((op @ (Opcode::Fetch(_) | Opcode::FetchStr(_)), offset))
                if offset + 1 == self.len =>
            {
                self.len = offset;
                self.last = None;
                Some(op)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Operator Stack
// =============================================================================

/// An operator waiting to be emitted.
#[derive(Clone, Copy, Debug)]
struct Pending {
    element: &'static Element,
    code: Option<Opcode>,
    effect: i32,
}

impl Pending {
    fn new(element: &'static Element) -> Self {
        Self {
            element,
            code: element.code,
            effect: i32::from(element.effect),
        }
    }

    fn marker(element: &'static Element, code: Opcode) -> Self {
        Self {
            element,
            code: Some(code),
            effect: 0,
        }
    }
}

struct OperatorStack {
    entries: [Option<Pending>; OPERATOR_STACK_SIZE],
    len: usize,
}

impl OperatorStack {
    const fn new() -> Self {
        Self {
            entries: [None; OPERATOR_STACK_SIZE],
            len: 0,
        }
    }

    fn push(&mut self, pending: Pending) -> std::result::Result<(), CompileErrorKind> {
        let slot = self
            .entries
            .get_mut(self.len)
            .ok_or(CompileErrorKind::Overflow)?;
        *slot = Some(pending);
        self.len += 1;
        Ok(())
    }

    fn top(&self) -> Option<&Pending> {
        self.len.checked_sub(1).and_then(|i| self.entries[i].as_ref())
    }

    fn top_mut(&mut self) -> Option<&mut Pending> {
        self.len.checked_sub(1).and_then(|i| self.entries[i].as_mut())
    }

    fn pop(&mut self) -> Option<Pending> {
        let i = self.len.checked_sub(1)?;
        self.len = i;
        self.entries[i].take()
    }

    /// Finds the topmost pending indexed fetch.
    fn find_array_fetch(&self) -> Option<usize> {
        (0..self.len).rev().find(|&i| {
            self.entries[i].is_some_and(|p| {
                matches!(p.code, Some(Opcode::ArrayFetch | Opcode::ArrayFetchStr))
            })
        })
    }
}

// =============================================================================
// Compiler
// =============================================================================

struct Compiler<'src, 'out> {
    lexer: Lexer<'src>,
    out: Postfix<'out>,
    stack: OperatorStack,
    operand_needed: bool,
    depth: i32,
    cond_count: i32,
}

impl<'src, 'out> Compiler<'src, 'out> {
    fn new(source: &'src [u8], out: &'out mut [u8]) -> Self {
        Self {
            lexer: Lexer::new(source),
            out: Postfix::new(out),
            stack: OperatorStack::new(),
            operand_needed: true,
            depth: 0,
            cond_count: 0,
        }
    }

    fn fail(&self, kind: CompileErrorKind) -> Error {
        Error::compile(kind, self.lexer.position())
    }

    fn run(mut self) -> Result<usize> {
        if self.lexer.at_end() {
            return Err(self.fail(CompileErrorKind::NullArg));
        }
        self.compile().map_err(|kind| self.fail(kind))?;
        Ok(self.out.len)
    }

    fn compile(&mut self) -> std::result::Result<(), CompileErrorKind> {
        self.out.byte(TAG_NO_STRING)?;

        while let Some((element, start)) = self.lexer.next_element(self.operand_needed) {
            if element.code.is_some_and(Opcode::uses_string) {
                self.out.mark_uses_string();
            }
            self.element(element, start)?;

            if self.depth < 0 {
                return Err(CompileErrorKind::Underflow);
            }
            if self.depth >= STACK_SIZE as i32 {
                return Err(CompileErrorKind::Overflow);
            }
        }

        if !self.lexer.at_end() {
            return Err(CompileErrorKind::Syntax);
        }

        while let Some(top) = self.stack.top() {
            if top.element.opener().is_some() {
                return Err(CompileErrorKind::ParenOpen);
            }
            self.emit_top()?;
        }
        self.out.op(Opcode::End)?;

        if self.cond_count != 0 {
            return Err(CompileErrorKind::Conditional);
        }
        if self.operand_needed || self.depth != 1 {
            return Err(CompileErrorKind::Incomplete);
        }
        Ok(())
    }

    fn element(
        &mut self,
        element: &'static Element,
        start: usize,
    ) -> std::result::Result<(), CompileErrorKind> {
        match element.kind {
            ElementKind::Operand => {
                let code = element.code.ok_or(CompileErrorKind::Internal)?;
                self.out.op(code)?;
                self.depth += i32::from(element.effect);
                self.operand_needed = false;
            }

            ElementKind::LiteralOperand => {
                self.depth += i32::from(element.effect);
                let value = self
                    .lexer
                    .scan_number(start)
                    .ok_or(CompileErrorKind::BadLiteral)?;
                self.literal(value)?;
                self.operand_needed = false;
            }

            ElementKind::StringOperand => {
                self.depth += i32::from(element.effect);
                let quote = element.name.as_bytes()[0];
                self.out.op(Opcode::LiteralString)?;
                let text = self.lexer.scan_string(quote);
                self.out.bytes(text)?;
                self.out.byte(0)?;
                self.operand_needed = false;
            }

            ElementKind::UnaryOperator | ElementKind::VarargOperator => {
                self.flush_while(|p| p.element.stack_priority >= element.incoming_priority)?;
                self.stack.push(Pending::new(element))?;
            }

            ElementKind::BinaryOperator => {
                self.flush_while(|p| p.element.stack_priority >= element.incoming_priority)?;
                self.stack.push(Pending::new(element))?;
                self.operand_needed = true;
            }

            ElementKind::StoreOperator => self.store(element)?,

            ElementKind::Separator => {
                self.flush_to_opener(CompileErrorKind::BadSeparator)?;
                if let Some(opener) = self.stack.top_mut() {
                    opener.effect -= 1;
                }
                self.operand_needed = true;
            }

            ElementKind::CloseParen => {
                self.close(b'(', CompileErrorKind::ParenNotOpen)?;
                let paren = self.stack.pop().ok_or(CompileErrorKind::ParenNotOpen)?;
                if let Some(func) = self.stack.top_mut() {
                    if func.element.kind == ElementKind::VarargOperator {
                        func.effect = paren.effect;
                        if func.effect > 0 {
                            return Err(CompileErrorKind::Incomplete);
                        }
                    }
                }
            }

            ElementKind::CloseBracket => self.close_group(b'[', CompileErrorKind::BracketNotOpen)?,

            ElementKind::CloseCurly => self.close_group(b'{', CompileErrorKind::CurlyNotOpen)?,

            ElementKind::Conditional => {
                self.flush_while(|p| p.element.stack_priority > element.incoming_priority)?;
                let code = element.code.ok_or(CompileErrorKind::Internal)?;
                self.out.op(code)?;
                self.depth += i32::from(element.effect);

                if code == Opcode::CondElse {
                    self.cond_count -= 1;
                    if self.cond_count < 0 {
                        return Err(CompileErrorKind::Conditional);
                    }
                    self.stack.push(Pending::marker(element, Opcode::CondEnd))?;
                } else {
                    self.cond_count += 1;
                }
                self.operand_needed = true;
            }

            ElementKind::UntilOperator => {
                self.flush_while(|p| p.element.stack_priority >= element.incoming_priority)?;
                self.out.op(Opcode::Until)?;
                self.depth += i32::from(element.effect);
                self.stack.push(Pending::marker(element, Opcode::UntilEnd))?;
            }

            ElementKind::ExprTerminator => {
                self.flush_while(|p| p.element.opener() != Some(b'('))?;
                self.operand_needed = true;
            }
        }
        Ok(())
    }

    /// Emits a numeric literal, as an integer when the value is one exactly.
    fn literal(&mut self, value: f64) -> std::result::Result<(), CompileErrorKind> {
        let int = value as i32;
        if f64::from(int) == value {
            self.out.op(Opcode::LiteralInt)?;
            self.out.bytes(&int.to_le_bytes())
        } else {
            self.out.op(Opcode::LiteralDouble)?;
            self.out.bytes(&value.to_le_bytes())
        }
    }

    /// Rewrites the assignment target into a store.
    ///
    /// A pending `@`/`@@` becomes an indexed store in place; otherwise the
    /// letter fetch just emitted is taken back and its store waits on the
    /// operator stack.
    fn store(&mut self, element: &'static Element) -> std::result::Result<(), CompileErrorKind> {
        if let Some(at) = self.stack.find_array_fetch() {
            let code = match self.stack.entries[at].and_then(|p| p.code) {
                Some(Opcode::ArrayFetchStr) => Opcode::ArrayStoreStr,
                _ => Opcode::ArrayStore,
            };
            self.stack.entries[at] = Some(Pending {
                code: Some(code),
                ..Pending::new(element)
            });
            while self.stack.len > at + 1 {
                self.emit_top()?;
            }
        } else {
            let code = match self.out.retract_fetch() {
                Some(Opcode::Fetch(i)) => Opcode::Store(i),
                Some(Opcode::FetchStr(i)) => Opcode::StoreStr(i),
                _ => return Err(CompileErrorKind::BadAssignment),
            };
            self.stack.push(Pending {
                code: Some(code),
                ..Pending::new(element)
            })?;
        }
        self.depth -= 1;
        self.operand_needed = true;
        Ok(())
    }

    /// Flushes down to the nearest opener, failing with `missing` if there
    /// is none.
    fn flush_to_opener(&mut self, missing: CompileErrorKind) -> std::result::Result<u8, CompileErrorKind> {
        loop {
            let top = self.stack.top().ok_or(missing)?;
            if let Some(opener) = top.element.opener() {
                return Ok(opener);
            }
            self.emit_top()?;
        }
    }

    /// Flushes down to an opener which must be `open`.
    fn close(&mut self, open: u8, missing: CompileErrorKind) -> std::result::Result<(), CompileErrorKind> {
        if self.flush_to_opener(missing)? == open {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// Closes a `[...]` or `{...}` group, emitting its opcode.
    ///
    /// A group takes exactly two arguments.
    fn close_group(&mut self, open: u8, missing: CompileErrorKind) -> std::result::Result<(), CompileErrorKind> {
        self.close(open, missing)?;
        let group = self.stack.pop().ok_or(missing)?;
        if group.effect != -2 {
            return Err(CompileErrorKind::Incomplete);
        }
        let code = group.code.ok_or(CompileErrorKind::Internal)?;
        self.out.op(code)?;
        self.depth += group.effect;
        Ok(())
    }

    fn flush_while(
        &mut self,
        pred: impl Fn(&Pending) -> bool,
    ) -> std::result::Result<(), CompileErrorKind> {
        while self.stack.top().is_some_and(&pred) {
            self.emit_top()?;
        }
        Ok(())
    }

    /// Pops the top operator into the output.
    fn emit_top(&mut self) -> std::result::Result<(), CompileErrorKind> {
        let pending = self.stack.pop().ok_or(CompileErrorKind::Internal)?;
        let code = pending.code.ok_or(CompileErrorKind::ParenOpen)?;
        self.out.op(code)?;
        if pending.element.kind == ElementKind::VarargOperator {
            let count = u8::try_from(1 - pending.effect).map_err(|_| CompileErrorKind::Internal)?;
            self.out.byte(count)?;
        }
        self.depth += pending.effect;
        Ok(())
    }
}
