//! Integration tests for FixedString
//!
//! Tests the bounded inline byte string behind every string value.

use scalc_foundation::{FixedString, STRING_SIZE};

#[test]
fn truncates_to_capacity() {
    let long = "x".repeat(100);
    let s = FixedString::from(long.as_str());
    assert_eq!(s.len(), STRING_SIZE - 1);
}

#[test]
fn stops_at_nul() {
    let s = FixedString::from_bytes(b"ab\0cd");
    assert_eq!(s, "ab");
}

#[test]
fn push_and_search() {
    let mut s = FixedString::from("abcabc");
    assert_eq!(s.find(b"bc"), Some(1));
    assert_eq!(s.rfind(b"bc"), Some(4));
    s.push_str("!");
    assert_eq!(s, "abcabc!");
    s.remove_range(0, 3);
    assert_eq!(s, "abc!");
}

#[test]
fn ordering_is_bytewise() {
    assert!(FixedString::from("abc") < FixedString::from("abd"));
    assert!(FixedString::from("ab") < FixedString::from("abc"));
    assert_eq!(FixedString::new(), FixedString::default());
}

#[test]
fn lossy_display_of_binary_bytes() {
    let s = FixedString::from_bytes(&[b'a', 0xff, b'b']);
    assert_eq!(s.len(), 3);
    assert!(s.to_string_lossy().starts_with('a'));
}
