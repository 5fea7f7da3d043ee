//! Fixed-depth evaluation stack.

use scalc_foundation::{Error, EvalErrorKind, Result, STACK_SIZE, Value};

/// The VM operand stack: `STACK_SIZE` cells, never reallocated.
pub(crate) struct EvalStack {
    cells: [Value; STACK_SIZE],
    len: usize,
}

fn underflow() -> Error {
    Error::eval(EvalErrorKind::StackUnderflow)
}

impl EvalStack {
    pub(crate) fn new() -> Self {
        Self {
            cells: [Value::Number(0.0); STACK_SIZE],
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn push(&mut self, value: Value) -> Result<()> {
        let slot = self
            .cells
            .get_mut(self.len)
            .ok_or_else(|| Error::eval(EvalErrorKind::StackOverflow))?;
        *slot = value;
        self.len += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Value> {
        self.len = self.len.checked_sub(1).ok_or_else(underflow)?;
        Ok(self.cells[self.len])
    }

    pub(crate) fn top(&self) -> Result<&Value> {
        self.len.checked_sub(1).map(|i| &self.cells[i]).ok_or_else(underflow)
    }

    pub(crate) fn top_mut(&mut self) -> Result<&mut Value> {
        let i = self.len.checked_sub(1).ok_or_else(underflow)?;
        Ok(&mut self.cells[i])
    }

    /// Pops the top `n` cells, returning them bottom first.
    pub(crate) fn pop_n(&mut self, n: usize) -> Result<&[Value]> {
        let start = self.len.checked_sub(n).ok_or_else(underflow)?;
        let end = self.len;
        self.len = start;
        Ok(&self.cells[start..end])
    }

    /// Drops cells above depth `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }
}
