//! The dual-typed evaluation cell.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::numeric::{atof, number_to_text};
use crate::text::FixedString;

/// A value on the evaluation stack: either a number or a bounded string.
///
/// Exactly one representation is live at a time. Conversions happen on
/// demand: numbers print as `%.8g`, text parses by its numeric prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// 64-bit floating point number.
    Number(f64),
    /// Fixed-capacity byte string.
    Text(FixedString),
}

impl Value {
    /// Creates a text value, truncating to capacity.
    #[must_use]
    pub fn text(s: &str) -> Self {
        Self::Text(FixedString::from(s))
    }

    /// Returns true if this is a number.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Returns true if this is text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns the numeric view without changing the cell.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(d) => *d,
            Self::Text(s) => atof(s.as_bytes()),
        }
    }

    /// Returns the text view without changing the cell.
    #[must_use]
    pub fn as_text(&self) -> FixedString {
        match self {
            Self::Number(d) => number_to_text(*d),
            Self::Text(s) => *s,
        }
    }

    /// Converts the cell to a number in place and returns it.
    pub fn coerce_number(&mut self) -> f64 {
        let d = self.as_number();
        *self = Self::Number(d);
        d
    }

    /// Converts the cell to text in place and returns a copy of the text.
    pub fn coerce_text(&mut self) -> FixedString {
        let s = self.as_text();
        *self = Self::Text(s);
        s
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Number(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<FixedString> for Value {
    fn from(s: FixedString) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(d) => write!(f, "{}", number_to_text(*d)),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_coerces_to_canonical_text() {
        let mut v = Value::Number(2.5);
        assert_eq!(v.coerce_text(), "2.5");
        assert!(v.is_text());
    }

    #[test]
    fn text_coerces_by_numeric_prefix() {
        let mut v = Value::text("42 degrees");
        assert!((v.coerce_number() - 42.0).abs() < f64::EPSILON);
        assert!(v.is_number());
    }

    #[test]
    fn nan_prints_as_nan() {
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn views_do_not_mutate() {
        let v = Value::text("7");
        assert!((v.as_number() - 7.0).abs() < f64::EPSILON);
        assert!(v.is_text());
    }
}
