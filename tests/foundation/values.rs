//! Integration tests for Value and the numeric conversions
//!
//! Tests the dual number/text views and C-compatible number formatting.

use scalc_foundation::Value;
use scalc_foundation::numeric::{atof, hunt_number, nint_index, number_to_text, round_half_away};

// =============================================================================
// Value Views
// =============================================================================

#[test]
fn number_views() {
    let v = Value::Number(2.5);
    assert!(v.is_number());
    assert_eq!(v.as_number(), 2.5);
    assert_eq!(v.as_text(), "2.5");
}

#[test]
fn text_views() {
    let v = Value::text("  -12.5e1xyz");
    assert!(v.is_text());
    assert_eq!(v.as_number(), -125.0);
    assert_eq!(v.as_text(), "  -12.5e1xyz");
}

#[test]
fn coercion_changes_the_cell() {
    let mut v = Value::text("7");
    assert_eq!(v.coerce_number(), 7.0);
    assert!(v.is_number());

    let mut v = Value::Number(0.25);
    assert_eq!(v.coerce_text(), "0.25");
    assert!(v.is_text());
}

// =============================================================================
// Number Text
// =============================================================================

#[test]
fn text_uses_eight_significant_digits() {
    assert_eq!(number_to_text(1.0 / 3.0), "0.33333333");
    assert_eq!(number_to_text(1_234_567_890.0), "1.2345679e+09");
    assert_eq!(number_to_text(100.0), "100");
    assert_eq!(number_to_text(-0.5), "-0.5");
    assert_eq!(number_to_text(f64::NAN), "NaN");
}

#[test]
fn atof_stops_at_garbage() {
    assert_eq!(atof(b"3.5volts"), 3.5);
    assert_eq!(atof(b"  42"), 42.0);
    assert_eq!(atof(b"volts"), 0.0);
    assert_eq!(atof(b""), 0.0);
}

#[test]
fn hunt_finds_embedded_numbers() {
    assert_eq!(hunt_number(b"T=-.5C"), -0.5);
    assert_eq!(hunt_number(b"abc12def"), 12.0);
    assert_eq!(hunt_number(b"none"), 0.0);
}

#[test]
fn rounding_is_half_away_from_zero() {
    assert_eq!(round_half_away(2.5), 3.0);
    assert_eq!(round_half_away(-2.5), -3.0);
    assert_eq!(round_half_away(2.4), 2.0);
    assert_eq!(nint_index(-0.6), -1);
    assert_eq!(nint_index(3.49), 3);
}
