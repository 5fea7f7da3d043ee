//! Property tests for the bounded string and number conversions.
//!
//! These pin the truncation rules of [`FixedString`] and check that the
//! C-style number parsing and `%.8g` rendering agree with each other.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::FixedString;
    use crate::numeric::{atof, nint_index, number_to_text, parse_prefix};

    /// Bytes up to and excluding the first NUL, capped at capacity.
    fn expected_content(bytes: &[u8]) -> &[u8] {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        &bytes[..end.min(FixedString::CAPACITY)]
    }

    // ==========================================================================
    // FixedString
    // ==========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        /// Construction keeps the C-string prefix, truncated to capacity.
        #[test]
        fn from_bytes_keeps_bounded_prefix(bytes in prop::collection::vec(any::<u8>(), 0..120)) {
            let s = FixedString::from_bytes(&bytes);
            prop_assert_eq!(s.as_bytes(), expected_content(&bytes));
            prop_assert!(s.len() <= FixedString::CAPACITY);
        }

        /// Appending never grows past capacity and never disturbs the head.
        #[test]
        fn push_bytes_appends_within_capacity(
            head in "[a-z]{0,50}",
            tail in prop::collection::vec(1u8..=255, 0..60),
        ) {
            let mut s = FixedString::from(head.as_str());
            s.push_bytes(&tail);
            let mut joined = head.into_bytes();
            joined.extend_from_slice(&tail);
            prop_assert_eq!(s.as_bytes(), expected_content(&joined));
        }

        /// `from_bytes_limited` never exceeds its limit.
        #[test]
        fn limited_respects_limit(bytes in prop::collection::vec(1u8..=255, 0..60), limit in 0usize..50) {
            let s = FixedString::from_bytes_limited(&bytes, limit);
            prop_assert!(s.len() <= limit.min(FixedString::CAPACITY));
            prop_assert!(bytes.starts_with(s.as_bytes()));
        }
    }

    // ==========================================================================
    // Numbers
    // ==========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        /// Prefix parsing never panics and never reads past the input.
        #[test]
        fn parse_prefix_stays_in_bounds(bytes in prop::collection::vec(any::<u8>(), 0..40)) {
            if let Some((_, consumed)) = parse_prefix(&bytes) {
                prop_assert!(consumed > 0);
                prop_assert!(consumed <= bytes.len());
            }
        }

        /// Rust's shortest exponent form parses back exactly.
        #[test]
        fn parse_prefix_reads_exponent_form(value in prop::num::f64::NORMAL | prop::num::f64::ZERO) {
            let text = format!("{value:e}");
            let (parsed, consumed) = parse_prefix(text.as_bytes()).unwrap();
            prop_assert_eq!(consumed, text.len());
            prop_assert_eq!(parsed, value);
        }

        /// Canonical text keeps eight significant digits.
        #[test]
        fn number_text_round_trips_to_eight_digits(value in prop::num::f64::NORMAL) {
            let text = number_to_text(value);
            prop_assert!(text.len() <= FixedString::CAPACITY);
            let back = atof(text.as_bytes());
            prop_assert!((back - value).abs() <= value.abs() * 1e-7, "{} -> {}", value, text.to_string_lossy());
        }

        /// Rounding to an index moves by at most one half.
        #[test]
        fn nint_index_is_nearest(value in -1.0e9f64..1.0e9) {
            prop_assert!((f64::from(nint_index(value)) - value).abs() <= 0.5);
        }
    }
}
