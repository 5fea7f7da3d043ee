//! Bytecode interpreter for sCalc expressions.
//!
//! [`Vm`] runs a compiled [`Bytecode`] buffer against a set of [`Registers`]
//! and produces an [`Outcome`] holding both the numeric and the string view
//! of the result.
//!
//! One interpreter serves both kinds of buffer. The type tag only selects the
//! integer widths used by `%`, the shifts and `~`, which differ between
//! numeric-only and string-capable expressions.
//!
//! # Control Flow
//!
//! Conditionals jump forward by searching for the matching `COND_ELSE` or
//! `COND_END`. `UNTIL` loops are paired by a scan before execution and share
//! one iteration budget, [`EvalConfig::loop_max`].

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

mod context;
mod loops;
mod native;
mod stack;

pub use context::{Operands, Outcome, Registers};
pub use loops::MAX_LOOPS;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scalc_foundation::numeric::nint_index;
use scalc_foundation::{Error, EvalConfig, EvalErrorKind, FixedString, Result, Value};
use tracing::{trace, warn};

use crate::opcode::{Bytecode, Opcode, Operand, TAG_NO_STRING, TAG_USES_STRING, decode};
use loops::LoopTable;
use stack::EvalStack;

/// Counters kept by a [`Vm`] across evaluations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VmStats {
    /// Evaluations started.
    pub evaluations: u64,
    /// Instructions executed.
    pub instructions: u64,
    /// Deepest evaluation stack seen.
    pub high_water: usize,
}

/// Stack-based interpreter for compiled expressions.
///
/// A `Vm` holds no per-evaluation state between calls; it owns only its
/// configuration, the random number generator and diagnostic counters.
pub struct Vm {
    config: EvalConfig,
    rng: ChaCha8Rng,
    stats: VmStats,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a VM with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    /// Creates a VM with the given configuration.
    #[must_use]
    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            stats: VmStats::default(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Replaces the configuration, reseeding the generator if the seed changed.
    pub fn set_config(&mut self, config: EvalConfig) {
        if config.seed != self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(config.seed);
        }
        self.config = config;
    }

    /// Returns the diagnostic counters.
    #[must_use]
    pub fn stats(&self) -> VmStats {
        self.stats
    }

    /// Clears the diagnostic counters.
    pub fn reset_stats(&mut self) {
        self.stats = VmStats::default();
    }

    /// Evaluates `code` against `registers`.
    ///
    /// # Errors
    ///
    /// Returns an evaluation error for arithmetic faults, bad builtin
    /// arguments, loop faults, an unbalanced stack, a non-finite result, or a
    /// malformed buffer.
    pub fn evaluate<R: Registers + ?Sized>(
        &mut self,
        code: &Bytecode,
        registers: &mut R,
    ) -> Result<Outcome> {
        self.evaluate_bytes(code.as_bytes(), registers)
    }

    /// Evaluates a raw bytecode buffer against `registers`.
    ///
    /// # Errors
    ///
    /// See [`Vm::evaluate`].
    pub fn evaluate_bytes<R: Registers + ?Sized>(
        &mut self,
        code: &[u8],
        registers: &mut R,
    ) -> Result<Outcome> {
        self.stats.evaluations += 1;
        let result = self.run(code, registers)?;
        Outcome::from_value(result)
    }

    fn run<R: Registers + ?Sized>(&mut self, code: &[u8], registers: &mut R) -> Result<Value> {
        let fast_path = match code.first() {
            None | Some(0) => return Err(Error::eval(EvalErrorKind::EmptyExpression)),
            Some(&TAG_NO_STRING) => true,
            Some(&TAG_USES_STRING) => false,
            Some(_) => return Err(Error::malformed(0)),
        };
        let mut loops = LoopTable::scan(code)?;
        let mut stack = EvalStack::new();
        let mut iterations: u32 = 0;
        let mut pc = 1;

        loop {
            let (inst, next) = decode(code, pc)?;
            if self.config.trace {
                trace!(
                    target: "scalc::vm",
                    offset = inst.offset,
                    op = %inst.op,
                    depth = stack.len(),
                    "execute"
                );
            }
            self.stats.instructions += 1;
            pc = next;

            match inst.op {
                Opcode::End => break,

                // Literals and registers
                Opcode::LiteralDouble | Opcode::LiteralInt | Opcode::LiteralString => {
                    stack.push(match inst.operand {
                        Operand::Double(d) => Value::Number(d),
                        Operand::Int(i) => Value::Number(f64::from(i)),
                        Operand::Str(bytes) => Value::Text(FixedString::from_bytes(bytes)),
                        _ => return Err(Error::malformed(inst.offset)),
                    })?;
                }
                Opcode::FetchVal => stack.push(Value::Number(registers.previous_number()))?,
                Opcode::FetchSval => stack.push(Value::Text(registers.previous_text()))?,
                Opcode::Fetch(i) => {
                    let d = registers.numeric(usize::from(i)).unwrap_or(0.0);
                    stack.push(Value::Number(d))?;
                }
                Opcode::FetchStr(i) => {
                    let s = registers.string(usize::from(i)).unwrap_or_default();
                    stack.push(Value::Text(s))?;
                }
                Opcode::Store(i) => {
                    let d = stack.pop()?.as_number();
                    registers.set_numeric(usize::from(i), d);
                }
                Opcode::StoreStr(i) => {
                    let s = stack.pop()?.as_text();
                    registers.set_string(usize::from(i), s);
                }
                Opcode::ArrayFetch => {
                    let top = stack.top_mut()?;
                    let index = top.as_number();
                    let d = register_index(index).and_then(|i| registers.numeric(i));
                    if d.is_none() {
                        warn!(target: "scalc::vm", index, "indexed numeric fetch out of range");
                    }
                    *top = Value::Number(d.unwrap_or(0.0));
                }
                Opcode::ArrayFetchStr => {
                    let top = stack.top_mut()?;
                    let index = top.as_number();
                    let s = register_index(index).and_then(|i| registers.string(i));
                    if s.is_none() {
                        warn!(target: "scalc::vm", index, "indexed string fetch out of range");
                    }
                    *top = Value::Text(s.unwrap_or_default());
                }
                Opcode::ArrayStore => {
                    let d = stack.pop()?.as_number();
                    let index = stack.pop()?.as_number();
                    let stored = register_index(index).is_some_and(|i| registers.set_numeric(i, d));
                    if !stored {
                        warn!(target: "scalc::vm", index, "indexed numeric store out of range");
                    }
                }
                Opcode::ArrayStoreStr => {
                    let s = stack.pop()?.as_text();
                    let index = stack.pop()?.as_number();
                    let stored = register_index(index).is_some_and(|i| registers.set_string(i, s));
                    if !stored {
                        warn!(target: "scalc::vm", index, "indexed string store out of range");
                    }
                }

                // Constants
                Opcode::ConstPi
                | Opcode::ConstD2R
                | Opcode::ConstR2D
                | Opcode::ConstS2R
                | Opcode::ConstR2S => {
                    let d = native::constant(inst.op).ok_or_else(|| Error::malformed(inst.offset))?;
                    stack.push(Value::Number(d))?;
                }
                Opcode::Random => stack.push(Value::Number(native::uniform(&mut self.rng)))?,
                Opcode::NormalRandom => stack.push(Value::Number(native::normal(&mut self.rng)))?,

                // Binary operators
                Opcode::Add
                | Opcode::Sub
                | Opcode::SubLast
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::Power
                | Opcode::Atan2
                | Opcode::MaxVal
                | Opcode::MinVal
                | Opcode::RelOr
                | Opcode::RelAnd
                | Opcode::BitOr
                | Opcode::BitAnd
                | Opcode::BitXor
                | Opcode::ShiftRight
                | Opcode::ShiftLeft
                | Opcode::NotEq
                | Opcode::Less
                | Opcode::LessEq
                | Opcode::Equal
                | Opcode::GreaterEq
                | Opcode::Greater => {
                    let right = stack.pop()?;
                    let left = stack.top_mut()?;
                    *left = native::binary(inst.op, *left, right, fast_path)?;
                }

                // Vararg functions
                Opcode::Max | Opcode::Min | Opcode::Finite | Opcode::IsNan => {
                    let Operand::ArgCount(count) = inst.operand else {
                        return Err(Error::malformed(inst.offset));
                    };
                    if count == 0 {
                        return Err(Error::malformed(inst.offset));
                    }
                    let result = native::reduce(inst.op, stack.pop_n(usize::from(count))?);
                    stack.push(result)?;
                }

                // Two-operand string builtins
                Opcode::Printf | Opcode::BinWrite => {
                    let mut arg = stack.pop()?;
                    let format = stack.top_mut()?;
                    let text = if inst.op == Opcode::Printf {
                        native::printf(format, &mut arg)?
                    } else {
                        native::bin_write(format, &mut arg)?
                    };
                    *format = Value::Text(text);
                }
                Opcode::Sscanf => {
                    let format = stack.pop()?;
                    let input = stack.top_mut()?;
                    *input = native::sscanf(input, &format)?;
                }
                Opcode::BinRead => {
                    let format = stack.pop()?;
                    let input = stack.top_mut()?;
                    *input = Value::Number(native::bin_read(input, &format)?);
                }

                // Three-operand string builtins
                Opcode::Subrange => {
                    let last = stack.pop()?;
                    let first = stack.pop()?;
                    let host = stack.top_mut()?;
                    let text = host.coerce_text();
                    *host = Value::Text(native::subrange(&text, &first, &last));
                }
                Opcode::Replace => {
                    let new = stack.pop()?.as_text();
                    let old = stack.pop()?.as_text();
                    let host = stack.top_mut()?;
                    let text = host.coerce_text();
                    *host = Value::Text(native::replace(&text, &old, &new));
                }

                // Control flow
                Opcode::CondIf => {
                    if stack.pop()?.as_number() == 0.0 {
                        pc = skip_past(code, pc, Opcode::CondElse, inst.offset)?;
                    }
                }
                Opcode::CondElse => pc = skip_past(code, pc, Opcode::CondEnd, inst.offset)?,
                Opcode::CondEnd => {}
                Opcode::Until => loops.enter(inst.offset, stack.len())?,
                Opcode::UntilEnd => {
                    iterations = iterations.saturating_add(1);
                    if iterations > self.config.loop_max {
                        return Err(Error::eval(EvalErrorKind::LoopLimit {
                            limit: self.config.loop_max,
                        }));
                    }
                    if stack.top()?.as_number() == 0.0 {
                        let (head, depth) = loops.rewind(inst.offset)?;
                        stack.truncate(depth);
                        pc = head;
                    }
                }

                // Everything else works on the top cell in place
                _ => native::unary(inst.op, stack.top_mut()?, fast_path)?,
            }

            self.stats.high_water = self.stats.high_water.max(stack.len());
        }

        if stack.len() != 1 {
            return Err(Error::eval(EvalErrorKind::Unbalanced { depth: stack.len() }));
        }
        stack.pop()
    }
}

/// Rounds an indexed-access operand to a register index. NaN, infinities,
/// and negative values have none.
fn register_index(index: f64) -> Option<usize> {
    if !index.is_finite() {
        return None;
    }
    usize::try_from(nint_index(index)).ok()
}

/// Returns the offset just past the `target` that closes the conditional
/// whose branch instruction sits at `from`, skipping nested conditionals.
fn skip_past(code: &[u8], pc: usize, target: Opcode, from: usize) -> Result<usize> {
    let mut depth = 1;
    let mut offset = pc;
    loop {
        let (inst, next) = decode(code, offset)?;
        offset = next;
        match inst.op {
            Opcode::End => break,
            Opcode::CondIf => depth += 1,
            op if op == target => {
                depth -= 1;
                if depth == 0 {
                    return Ok(offset);
                }
            }
            _ => {}
        }
    }
    Err(Error::eval(EvalErrorKind::UnmatchedConditional { offset: from }))
}

/// Compiles `source` and evaluates it against `registers` with a fresh VM.
///
/// # Errors
///
/// Returns the compile error or the evaluation error.
pub fn eval<R: Registers + ?Sized>(source: &str, registers: &mut R) -> Result<Outcome> {
    let code = crate::compiler::compile(source)?;
    Vm::new().evaluate(&code, registers)
}
