//! Sequential byte-stream view over a [`Buffer`].

use std::io;

use crate::Buffer;

/// Byte-stream adapter for code that does not know about [`Buffer`].
///
/// The adapter holds no state of its own; every call reads the live cursors
/// of the wrapped buffer, so progress made through the adapter is visible to
/// the buffer's owner and vice versa.
///
/// # Example
///
/// ```
/// use fory_buffers::{Buffer, BufferInputStream};
///
/// let mut buffer = Buffer::from_bytes(&[1, 2, 3]);
/// let mut stream = BufferInputStream::new(&mut buffer);
/// assert_eq!(stream.read_byte(), Some(1));
/// assert_eq!(stream.skip(10), 2);
/// assert_eq!(stream.read_byte(), None);
/// ```
#[derive(Debug)]
pub struct BufferInputStream<'a> {
    buffer: &'a mut Buffer,
}

impl<'a> BufferInputStream<'a> {
    pub fn new(buffer: &'a mut Buffer) -> Self {
        Self { buffer }
    }

    /// Next byte, or `None` once the buffer is drained.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.buffer.read_u8().ok()
    }

    /// Copies up to `dest.len()` bytes.
    ///
    /// Returns `Some(0)` for an empty `dest` and `None` when `dest` is
    /// non-empty but nothing is left to read.
    pub fn read_into(&mut self, dest: &mut [u8]) -> Option<usize> {
        if dest.is_empty() {
            return Some(0);
        }
        let n = self.buffer.remaining().min(dest.len());
        if n == 0 {
            return None;
        }
        self.buffer.read_bytes(&mut dest[..n]).ok()?;
        Some(n)
    }

    /// Skips up to `n` bytes and returns how many were skipped.
    pub fn skip(&mut self, n: u64) -> u64 {
        let n = n.min(self.buffer.remaining() as u64) as usize;
        // Cannot fail: n is clamped to remaining().
        let _ = self.buffer.increase_reader_index(n);
        n as u64
    }

    pub fn available(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn get_ref(&self) -> &Buffer {
        self.buffer
    }

    pub fn get_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    pub fn into_inner(self) -> &'a mut Buffer {
        self.buffer
    }
}

impl io::Read for BufferInputStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf).unwrap_or(0))
    }
}

impl io::BufRead for BufferInputStream<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.buffer.unread())
    }

    fn consume(&mut self, amt: usize) {
        self.skip(amt as u64);
    }
}
