// Residual byte buffer shared by both demuxer families
//
// Holds the unconsumed tail of everything pushed so far. A new chunk is
// logically concatenated onto that tail before parsing resumes. The backing
// storage is never mutated in place: appending builds a new buffer and
// consuming re-slices it, so packets handed out earlier stay valid.

use std::ops::Range;

use bytes::{Bytes, BytesMut};

/// Append-only view over unconsumed input.
#[derive(Debug, Default, Clone)]
pub struct ByteCursor {
    data: Option<Bytes>,
}

impl ByteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `chunk` onto the retained tail.
    pub fn append(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let joined = match self.data.take() {
            Some(tail) if !tail.is_empty() => {
                let mut buf = BytesMut::with_capacity(tail.len() + chunk.len());
                buf.extend_from_slice(&tail);
                buf.extend_from_slice(chunk);
                buf.freeze()
            }
            _ => Bytes::copy_from_slice(chunk),
        };
        self.data = Some(joined);
    }

    /// The unconsumed bytes.
    pub fn bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-copy slice of the unconsumed bytes. `range` must lie within `len()`.
    pub fn slice(&self, range: Range<usize>) -> Bytes {
        match &self.data {
            Some(data) => data.slice(range),
            None => Bytes::new(),
        }
    }

    /// Drop `count` bytes from the front, clamped to what is buffered.
    pub fn advance(&mut self, count: usize) {
        if let Some(data) = self.data.take() {
            let count = count.min(data.len());
            if count < data.len() {
                self.data = Some(data.slice(count..));
            }
        }
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_concatenates_tail() {
        let mut cursor = ByteCursor::new();
        assert!(cursor.is_empty());

        cursor.append(b"abc");
        cursor.advance(1);
        cursor.append(b"de");
        assert_eq!(cursor.bytes(), b"bcde");
    }

    #[test]
    fn test_slices_survive_advance_and_append() {
        let mut cursor = ByteCursor::new();
        cursor.append(b"hello world");
        let hello = cursor.slice(0..5);

        cursor.advance(6);
        cursor.append(b"!");
        assert_eq!(&hello[..], b"hello");
        assert_eq!(cursor.bytes(), b"world!");
    }

    #[test]
    fn test_advance_past_end_empties() {
        let mut cursor = ByteCursor::new();
        cursor.append(b"xy");
        cursor.advance(10);
        assert!(cursor.is_empty());
        assert!(cursor.slice(0..0).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cursor = ByteCursor::new();
        cursor.append(b"xyz");
        cursor.clear();
        assert_eq!(cursor.len(), 0);
    }
}
