//! Immutable byte payload stored in the cache.

use std::fmt;
use std::sync::Arc;

use crate::lru::Value;

/// An immutable view of cached bytes.
///
/// Bytes are copied in on construction and copied out by [`ByteView::byte_slice`],
/// so neither the producer nor a reader can change what the cache holds.
/// Cloning a view shares the underlying buffer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Arc<[u8]>,
}

impl ByteView {
    /// Create a view holding a private copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            b: Arc::from(bytes),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns a fresh copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.b.len()
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

// String view; non-UTF-8 bytes are rendered lossily.
impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.b.len())
            .field("data", &String::from_utf8_lossy(&self.b))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_copies_input() {
        let mut source = b"hello".to_vec();
        let view = ByteView::new(&source);
        source[0] = b'j';
        assert_eq!(view.to_string(), "hello");
    }

    #[test]
    fn byte_slice_returns_independent_copy() {
        let view = ByteView::from("hello");
        let mut copy = view.byte_slice();
        copy[0] = b'J';
        copy.push(b'!');
        assert_eq!(view.byte_slice(), b"hello");
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn reports_len_for_eviction_accounting() {
        let view = ByteView::from("abc");
        assert_eq!(Value::len(&view), 3);
        assert!(ByteView::default().is_empty());
    }

    #[test]
    fn string_view_is_lossy_for_invalid_utf8() {
        let view = ByteView::new(&[0x66, 0xff, 0x6f]);
        assert_eq!(view.to_string(), "f\u{fffd}o");
    }
}
