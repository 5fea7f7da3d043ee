//! Property tests for the dual number/text views of Value

use proptest::prelude::*;
use scalc_foundation::{FixedString, Value};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Integers with at most eight digits render exactly.
    #[test]
    fn integers_render_exactly(n in -99_999_999i32..=99_999_999) {
        let text = Value::Number(f64::from(n)).as_text();
        prop_assert_eq!(text.to_string_lossy(), n.to_string());
    }

    /// Text is read up to the first non-numeric byte.
    #[test]
    fn text_reads_leading_number(n in any::<i32>(), unit in "[a-wyzA-WYZ ]{0,8}") {
        let value = Value::text(&format!("{n}{unit}"));
        prop_assert_eq!(value.as_number(), f64::from(n));
    }

    /// Coercing to text and back loses no more than the eighth digit.
    #[test]
    fn coercion_round_trip(value in prop::num::f64::NORMAL) {
        let mut cell = Value::Number(value);
        cell.coerce_text();
        prop_assert!(cell.is_text());
        let back = cell.coerce_number();
        prop_assert!((back - value).abs() <= value.abs() * 1e-7);
    }

    /// Any text survives in a cell up to capacity.
    #[test]
    fn text_cells_are_bounded(s in "[ -~]{0,80}") {
        let cell = Value::text(&s);
        let text = cell.as_text();
        prop_assert!(text.len() <= FixedString::CAPACITY);
        prop_assert!(s.as_bytes().starts_with(text.as_bytes()));
    }
}
