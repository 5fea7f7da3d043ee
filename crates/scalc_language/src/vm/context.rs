//! Register access for the VM.
//!
//! An expression reads and writes the numeric registers `A`..`P` and the
//! string registers `AA`..`LL`, plus the previous result through `VAL` and
//! `SVAL`. The VM reaches them through the [`Registers`] trait so a caller
//! can evaluate straight against its own storage; [`Operands`] is the plain
//! slice-backed implementation.

use scalc_foundation::numeric::{atof, number_to_text};
use scalc_foundation::{Error, EvalErrorKind, FixedString, Result, Value};

// =============================================================================
// Registers Trait
// =============================================================================

/// Register storage an expression evaluates against.
pub trait Registers {
    /// Reads numeric register `index`, or `None` if there is no such register.
    fn numeric(&self, index: usize) -> Option<f64>;

    /// Writes numeric register `index`. Returns false if there is no such
    /// register.
    fn set_numeric(&mut self, index: usize, value: f64) -> bool;

    /// Reads string register `index`, or `None` if there is no such register.
    fn string(&self, index: usize) -> Option<FixedString>;

    /// Writes string register `index`. Returns false if there is no such
    /// register.
    fn set_string(&mut self, index: usize, value: FixedString) -> bool;

    /// The previous numeric result, read by `VAL`.
    fn previous_number(&self) -> f64 {
        0.0
    }

    /// The previous string result, read by `SVAL`.
    fn previous_text(&self) -> FixedString {
        FixedString::new()
    }
}

// =============================================================================
// Operands
// =============================================================================

/// Registers backed by caller-owned slices.
///
/// Slices shorter than the sixteen numeric or twelve string registers are
/// fine: registers past the end read as 0 or empty and ignore stores.
#[derive(Debug)]
pub struct Operands<'a> {
    numbers: &'a mut [f64],
    strings: &'a mut [FixedString],
    val: f64,
    sval: FixedString,
}

impl<'a> Operands<'a> {
    /// Creates registers over the given argument slices.
    #[must_use]
    pub fn new(numbers: &'a mut [f64], strings: &'a mut [FixedString]) -> Self {
        Self {
            numbers,
            strings,
            val: 0.0,
            sval: FixedString::new(),
        }
    }

    /// Sets the previous result seen by `VAL` and `SVAL`.
    #[must_use]
    pub fn with_previous(mut self, val: f64, sval: FixedString) -> Self {
        self.val = val;
        self.sval = sval;
        self
    }
}

impl Registers for Operands<'_> {
    fn numeric(&self, index: usize) -> Option<f64> {
        self.numbers.get(index).copied()
    }

    fn set_numeric(&mut self, index: usize, value: f64) -> bool {
        self.numbers.get_mut(index).map(|slot| *slot = value).is_some()
    }

    fn string(&self, index: usize) -> Option<FixedString> {
        self.strings.get(index).copied()
    }

    fn set_string(&mut self, index: usize, value: FixedString) -> bool {
        self.strings.get_mut(index).map(|slot| *slot = value).is_some()
    }

    fn previous_number(&self) -> f64 {
        self.val
    }

    fn previous_text(&self) -> FixedString {
        self.sval
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of a successful evaluation, in both representations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    /// Numeric result. Always finite.
    pub number: f64,
    /// String result.
    pub text: FixedString,
}

impl Outcome {
    /// Builds the outcome from the final stack cell.
    ///
    /// # Errors
    ///
    /// Fails if the numeric view is NaN or infinite.
    pub fn from_value(value: Value) -> Result<Self> {
        let (number, text) = match value {
            Value::Number(d) => (d, number_to_text(d)),
            Value::Text(s) => (atof(s.as_bytes()), s),
        };
        if !number.is_finite() {
            return Err(Error::eval(EvalErrorKind::NonFinite(number)));
        }
        Ok(Self { number, text })
    }
}
