//! Byte sources a scanner reads from.

use bytes::{Buf, BytesMut};
use std::collections::VecDeque;

/// A non-blocking, byte-at-a-time input channel.
pub trait ByteSource {
    /// Number of bytes that can be read right now without waiting.
    fn available(&mut self) -> usize;

    /// Consumes the next byte, or `None` if nothing is available.
    fn read(&mut self) -> Option<u8>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }
}

impl ByteSource for VecDeque<u8> {
    fn available(&mut self) -> usize {
        self.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// In-memory source that bytes are pushed into as they arrive.
#[derive(Debug, Default)]
pub struct BufferSource {
    buffer: BytesMut,
}

impl BufferSource {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Appends bytes for later reads.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Returns the number of unread bytes.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discards unread bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl From<&[u8]> for BufferSource {
    fn from(data: &[u8]) -> Self {
        let mut source = Self::new();
        source.push(data);
        source
    }
}

impl ByteSource for BufferSource {
    fn available(&mut self) -> usize {
        self.buffer.len()
    }

    fn read(&mut self) -> Option<u8> {
        if self.buffer.has_remaining() {
            Some(self.buffer.get_u8())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_source_reads_in_order() {
        let mut source = BufferSource::from(&b"ab"[..]);
        assert_eq!(source.available(), 2);
        assert_eq!(source.read(), Some(b'a'));
        assert_eq!(source.read(), Some(b'b'));
        assert_eq!(source.available(), 0);
        assert_eq!(source.read(), None);
    }

    #[test]
    fn test_buffer_source_push_and_clear() {
        let mut source = BufferSource::new();
        source.push(b">set");
        source.push(b"!");
        assert_eq!(source.buffered(), 5);

        source.clear();
        assert_eq!(source.buffered(), 0);
    }

    #[test]
    fn test_vec_deque_source() {
        let mut source: VecDeque<u8> = b"xy".iter().copied().collect();
        assert_eq!(source.available(), 2);
        assert_eq!(source.read(), Some(b'x'));
        assert_eq!(source.available(), 1);
    }

    fn drain<S: ByteSource>(mut source: S) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = source.read() {
            out.push(b);
        }
        out
    }

    #[test]
    fn test_mut_ref_source() {
        let mut source = BufferSource::from(&b"zz"[..]);
        assert_eq!(drain(&mut source), b"zz");
        assert_eq!(source.available(), 0);
    }
}
