//! Bounded, stack-allocated byte strings.
//!
//! Every string slot in sCalc (arguments, stack cells, results) has the same
//! fixed capacity. Content is raw bytes, not necessarily UTF-8, and never
//! contains a NUL: anything from the first NUL on is dropped, the same way a
//! C string would end there.

#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::fmt;

/// Size of a string slot in bytes, including the terminator.
pub const STRING_SIZE: usize = 40;

const CAPACITY: usize = STRING_SIZE - 1;

/// A string of at most `STRING_SIZE - 1` bytes stored inline.
#[derive(Clone, Copy)]
pub struct FixedString {
    buf: [u8; CAPACITY],
    len: u8,
}

impl FixedString {
    /// Maximum number of content bytes.
    pub const CAPACITY: usize = CAPACITY;

    /// Creates an empty string.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; CAPACITY],
            len: 0,
        }
    }

    /// Creates a string from bytes, stopping at a NUL and truncating to capacity.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut s = Self::new();
        s.push_bytes(bytes);
        s
    }

    /// Creates a string from bytes keeping at most `limit` of them.
    #[must_use]
    pub fn from_bytes_limited(bytes: &[u8], limit: usize) -> Self {
        let mut s = Self::from_bytes(bytes);
        s.truncate(limit);
        s
    }

    /// Returns the content bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// Returns the content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Returns true if the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first byte, if any.
    #[must_use]
    pub fn first(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }

    /// Empties the string.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shortens the string to at most `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.len = len as u8;
        }
    }

    /// Appends bytes up to the first NUL, silently dropping what does not fit.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let bytes = bytes
            .iter()
            .position(|&b| b == 0)
            .map_or(bytes, |nul| &bytes[..nul]);
        let start = self.len();
        let n = bytes.len().min(CAPACITY - start);
        self.buf[start..start + n].copy_from_slice(&bytes[..n]);
        self.len = (start + n) as u8;
    }

    /// Appends a string slice.
    pub fn push_str(&mut self, s: &str) {
        self.push_bytes(s.as_bytes());
    }

    /// Replaces the content.
    pub fn set(&mut self, bytes: &[u8]) {
        self.clear();
        self.push_bytes(bytes);
    }

    /// Returns the offset of the first occurrence of `needle`.
    ///
    /// An empty needle matches at offset 0.
    #[must_use]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        find_bytes(self.as_bytes(), needle)
    }

    /// Returns the offset of the last occurrence of `needle`.
    #[must_use]
    pub fn rfind(&self, needle: &[u8]) -> Option<usize> {
        let hay = self.as_bytes();
        if needle.len() > hay.len() {
            return None;
        }
        (0..=hay.len() - needle.len())
            .rev()
            .find(|&i| &hay[i..i + needle.len()] == needle)
    }

    /// Removes `count` bytes starting at `at`.
    pub fn remove_range(&mut self, at: usize, count: usize) {
        let len = self.len();
        if at >= len {
            return;
        }
        let end = (at + count).min(len);
        self.buf.copy_within(end..len, at);
        self.len = (len - (end - at)) as u8;
    }

    /// Returns the content as text, replacing invalid UTF-8.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

/// Finds `needle` in `hay`, matching the empty needle at 0.
#[must_use]
pub(crate) fn find_bytes(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

impl Default for FixedString {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FixedString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for FixedString {}

impl PartialOrd for FixedString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialEq<str> for FixedString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for FixedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl From<&str> for FixedString {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<&[u8]> for FixedString {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Debug for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FixedString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.as_bytes())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FixedString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> serde::de::Visitor<'de> for BytesVisitor {
            type Value = FixedString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte string")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<FixedString, E> {
                Ok(FixedString::from_bytes(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<FixedString, E> {
                Ok(FixedString::from_bytes(v.as_bytes()))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<FixedString, A::Error> {
                let mut out = FixedString::new();
                while let Some(b) = seq.next_element::<u8>()? {
                    out.push_bytes(&[b]);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn push_appends_until_full() {
        let mut s = FixedString::from("hello");
        s.push_str(" world");
        assert_eq!(s, "hello world");
        s.push_bytes(&[b'z'; 64]);
        assert_eq!(s.len(), FixedString::CAPACITY);
    }

    #[test]
    fn find_and_rfind() {
        let s = FixedString::from("abcabc");
        assert_eq!(s.find(b"bc"), Some(1));
        assert_eq!(s.rfind(b"bc"), Some(4));
        assert_eq!(s.rfind(b"ab"), Some(3));
        assert_eq!(s.find(b"zz"), None);
        assert_eq!(s.find(b""), Some(0));
    }

    #[test]
    fn remove_range_shifts_tail() {
        let mut s = FixedString::from("abcdef");
        s.remove_range(1, 2);
        assert_eq!(s, "adef");
        s.remove_range(3, 10);
        assert_eq!(s, "ade");
    }

    #[test]
    fn ordering_is_bytewise() {
        assert!(FixedString::from("a") < FixedString::from("b"));
        assert!(FixedString::from("ab") > FixedString::from("a"));
    }
}
