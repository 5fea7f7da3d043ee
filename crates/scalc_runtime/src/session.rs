//! Session state for the REPL.
//!
//! The session holds the full register file an expression can see: the
//! sixteen numeric registers `A`..`P`, the twelve string registers
//! `AA`..`LL`, the previous result read back by `VAL` and `SVAL`, and the
//! evaluation configuration. It implements [`Registers`] so the VM evaluates
//! straight against it.

use std::fmt;
use std::path::PathBuf;

use scalc_foundation::numeric::atof;
use scalc_foundation::{EvalConfig, FixedString, NUMERIC_ARGS, STRING_ARGS};
use scalc_language::{Outcome, Registers};
use serde::{Deserialize, Serialize};

/// A register named by its letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    /// Numeric register `A`..`P`.
    Numeric(usize),
    /// String register `AA`..`LL`.
    Text(usize),
}

impl Register {
    /// Parses a register name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        match upper.as_bytes() {
            [c @ b'A'..=b'P'] => Some(Self::Numeric(usize::from(c - b'A'))),
            [a, b] if a == b && (b'A'..=b'L').contains(a) => Some(Self::Text(usize::from(a - b'A'))),
            _ => None,
        }
    }
}

impl fmt::Display for Register {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Numeric(i) => write!(f, "{}", char::from(b'A' + i as u8)),
            Self::Text(i) => {
                let c = char::from(b'A' + i as u8);
                write!(f, "{c}{c}")
            }
        }
    }
}

/// Session state for an interactive REPL session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Numeric registers `A`..`P`.
    numbers: [f64; NUMERIC_ARGS],

    /// String registers `AA`..`LL`.
    strings: [FixedString; STRING_ARGS],

    /// Previous numeric result, read by `VAL`.
    previous_number: f64,

    /// Previous string result, read by `SVAL`.
    previous_text: FixedString,

    /// Evaluation knobs.
    config: EvalConfig,

    /// Directory relative file paths resolve against.
    #[serde(skip)]
    load_path: PathBuf,
}

impl Session {
    /// Creates a session with zeroed registers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    /// Creates a session with zeroed registers and the given configuration.
    #[must_use]
    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            numbers: [0.0; NUMERIC_ARGS],
            strings: [FixedString::new(); STRING_ARGS],
            previous_number: 0.0,
            previous_text: FixedString::new(),
            config,
            load_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Returns the numeric registers.
    #[must_use]
    pub const fn numbers(&self) -> &[f64; NUMERIC_ARGS] {
        &self.numbers
    }

    /// Returns the string registers.
    #[must_use]
    pub const fn strings(&self) -> &[FixedString; STRING_ARGS] {
        &self.strings
    }

    /// Assigns a register from text: numeric registers parse it like `atof`,
    /// string registers take it as is.
    pub fn assign(&mut self, register: Register, text: &str) {
        match register {
            Register::Numeric(i) => {
                self.set_numeric(i, atof(text.as_bytes()));
            }
            Register::Text(i) => {
                self.set_string(i, FixedString::from(text));
            }
        }
    }

    /// Renders a register for display.
    #[must_use]
    pub fn show(&self, register: Register) -> String {
        match register {
            Register::Numeric(i) => {
                format!("{register} = {}", self.numeric(i).unwrap_or_default())
            }
            Register::Text(i) => {
                format!("{register} = \"{}\"", self.string(i).unwrap_or_default())
            }
        }
    }

    /// Returns the previous result as `(VAL, SVAL)`.
    #[must_use]
    pub fn previous(&self) -> (f64, FixedString) {
        (self.previous_number, self.previous_text)
    }

    /// Remembers `outcome` as the previous result.
    pub fn record(&mut self, outcome: &Outcome) {
        self.previous_number = outcome.number;
        self.previous_text = outcome.text;
    }

    /// Returns the evaluation configuration.
    #[must_use]
    pub const fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Returns the evaluation configuration for changing.
    pub fn config_mut(&mut self) -> &mut EvalConfig {
        &mut self.config
    }

    /// Returns the current load path.
    #[must_use]
    pub fn load_path(&self) -> &PathBuf {
        &self.load_path
    }

    /// Sets the load path.
    pub fn set_load_path(&mut self, path: PathBuf) {
        self.load_path = path;
    }

    /// Resolves a path relative to the load path.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = PathBuf::from(path);
        if candidate.is_absolute() {
            candidate
        } else {
            self.load_path.join(candidate)
        }
    }

    /// Replaces registers and configuration with those of `other`, keeping
    /// this session's load path.
    pub fn restore(&mut self, other: Session) {
        let load_path = std::mem::take(&mut self.load_path);
        *self = Self { load_path, ..other };
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers for Session {
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
        self.previous_number
    }

    fn previous_text(&self) -> FixedString {
        self.previous_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_names() {
        assert_eq!(Register::parse("A"), Some(Register::Numeric(0)));
        assert_eq!(Register::parse("p"), Some(Register::Numeric(15)));
        assert_eq!(Register::parse("ll"), Some(Register::Text(11)));
        assert_eq!(Register::parse("Q"), None);
        assert_eq!(Register::parse("MM"), None);
        assert_eq!(Register::parse("AB"), None);
        assert_eq!(Register::Text(2).to_string(), "CC");
        assert_eq!(Register::Numeric(3).to_string(), "D");
    }

    #[test]
    fn assign_and_show() {
        let mut session = Session::new();
        session.assign(Register::Numeric(1), "2.5volts");
        session.assign(Register::Text(0), "hello");
        assert_eq!(session.numbers()[1], 2.5);
        assert_eq!(session.show(Register::Numeric(1)), "B = 2.5");
        assert_eq!(session.show(Register::Text(0)), "AA = \"hello\"");
    }

    #[test]
    fn record_feeds_previous_registers() {
        let mut session = Session::new();
        session.record(&Outcome {
            number: 4.0,
            text: FixedString::from("4"),
        });
        assert_eq!(session.previous_number(), 4.0);
        assert_eq!(session.previous_text(), "4");
    }

    #[test]
    fn restore_keeps_load_path() {
        let mut session = Session::new();
        session.set_load_path(PathBuf::from("/tmp/scripts"));
        let mut other = Session::new();
        other.assign(Register::Numeric(0), "9");
        session.restore(other);
        assert_eq!(session.numbers()[0], 9.0);
        assert_eq!(session.load_path(), &PathBuf::from("/tmp/scripts"));
    }
}
