//! `UNTIL` loop bookkeeping.
//!
//! Before execution the bytecode is scanned once to pair every `UNTIL` with
//! its `UNTIL_END`. At run time `UNTIL` records the stack depth, and a
//! rewinding `UNTIL_END` looks up where to jump back to and how much of the
//! stack to discard.

use scalc_foundation::{Error, EvalErrorKind, Result};

use crate::opcode::{Instructions, Opcode};

/// Most `UNTIL` loops one expression may hold.
pub const MAX_LOOPS: usize = 10;

#[derive(Clone, Copy, Default)]
struct Entry {
    /// Offset of the `UNTIL` instruction.
    head: usize,
    /// Offset of the matching `UNTIL_END`.
    end: Option<usize>,
    /// Stack depth when `UNTIL` last ran.
    depth: usize,
}

/// Pairs of loop markers found in one buffer.
pub(crate) struct LoopTable {
    entries: [Entry; MAX_LOOPS],
    len: usize,
}

impl LoopTable {
    /// Pairs the loop markers of `code`; the innermost open `UNTIL` claims
    /// each `UNTIL_END`.
    ///
    /// # Errors
    ///
    /// Fails on more than [`MAX_LOOPS`] loops, on a marker without a partner,
    /// and on undecodable bytecode.
    pub(crate) fn scan(code: &[u8]) -> Result<Self> {
        let mut table = Self {
            entries: [Entry::default(); MAX_LOOPS],
            len: 0,
        };
        for inst in Instructions::new(code) {
            let inst = inst?;
            match inst.op {
                Opcode::Until => {
                    let entry = table.entries.get_mut(table.len).ok_or_else(|| {
                        Error::eval(EvalErrorKind::TooManyLoops { limit: MAX_LOOPS })
                    })?;
                    *entry = Entry {
                        head: inst.offset,
                        end: None,
                        depth: 0,
                    };
                    table.len += 1;
                }
                Opcode::UntilEnd => {
                    let open = table.entries[..table.len]
                        .iter_mut()
                        .rev()
                        .find(|e| e.end.is_none())
                        .ok_or_else(|| unmatched(inst.offset))?;
                    open.end = Some(inst.offset);
                }
                _ => {}
            }
        }
        if let Some(open) = table.entries[..table.len].iter().find(|e| e.end.is_none()) {
            return Err(unmatched(open.head));
        }
        Ok(table)
    }

    /// Returns the number of loops found.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Records the stack depth at the `UNTIL` at `head`.
    pub(crate) fn enter(&mut self, head: usize, depth: usize) -> Result<()> {
        let entry = self.entries[..self.len]
            .iter_mut()
            .find(|e| e.head == head)
            .ok_or_else(|| unmatched(head))?;
        entry.depth = depth;
        Ok(())
    }

    /// Returns the `UNTIL` offset and recorded depth for the `UNTIL_END` at
    /// `end`.
    pub(crate) fn rewind(&self, end: usize) -> Result<(usize, usize)> {
        self.entries[..self.len]
            .iter()
            .find(|e| e.end == Some(end))
            .map(|e| (e.head, e.depth))
            .ok_or_else(|| unmatched(end))
    }
}

fn unmatched(offset: usize) -> Error {
    Error::eval(EvalErrorKind::UnmatchedLoop { offset })
}
