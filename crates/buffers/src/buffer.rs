//! Growable byte buffer with independent reader and writer cursors.

use crate::BufferError;

const MIN_GROW: usize = 64;

/// A growable, bounds-checked byte region.
///
/// The buffer keeps `reader_index <= writer_index <= capacity` at all times.
/// Writes append at the writer index and grow the allocation (at least
/// doubling it) when they would overflow. Reads consume from the reader index
/// and fail with [`BufferError::Underflow`] instead of returning garbage when
/// fewer bytes than requested remain. A failed read leaves both cursors where
/// they were.
///
/// # Example
///
/// ```
/// use fory_buffers::{Buffer, BufferError};
///
/// let mut buffer = Buffer::from_bytes(&[0x01, 0x00]);
/// assert_eq!(buffer.read_i16().unwrap(), 1);
/// assert!(matches!(buffer.read_u8(), Err(BufferError::Underflow { .. })));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Vec<u8>,
    reader_index: usize,
    writer_index: usize,
}

impl Buffer {
    /// Creates an empty buffer. Nothing is allocated until the first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with `capacity` bytes pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            reader_index: 0,
            writer_index: 0,
        }
    }

    /// Creates a buffer holding a copy of `bytes`, ready to be read.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Wraps an existing vector; its whole length counts as written.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let writer_index = data.len();
        Self {
            data,
            reader_index: 0,
            writer_index,
        }
    }

    /// Bytes currently allocated.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn reader_index(&self) -> usize {
        self.reader_index
    }

    pub fn writer_index(&self) -> usize {
        self.writer_index
    }

    /// Number of unread bytes: `writer_index - reader_index`.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.writer_index - self.reader_index
    }

    /// Moves the reader cursor to an absolute position.
    pub fn set_reader_index(&mut self, index: usize) -> Result<(), BufferError> {
        if index > self.writer_index {
            return Err(BufferError::ReaderIndexOutOfBounds {
                index,
                writer_index: self.writer_index,
            });
        }
        self.reader_index = index;
        Ok(())
    }

    /// Advances the reader cursor without copying.
    pub fn increase_reader_index(&mut self, n: usize) -> Result<(), BufferError> {
        self.check_readable(n)?;
        self.reader_index += n;
        Ok(())
    }

    /// Resets both cursors, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.reader_index = 0;
        self.writer_index = 0;
    }

    /// Discards written bytes past `len`. No-op if `len >= writer_index`.
    pub fn truncate(&mut self, len: usize) {
        if len < self.writer_index {
            self.writer_index = len;
            self.reader_index = self.reader_index.min(len);
        }
    }

    /// The written extent `[0, writer_index)`.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.writer_index]
    }

    /// The unread extent `[reader_index, writer_index)`.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.reader_index..self.writer_index]
    }

    /// Consumes the buffer, returning the written extent.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.writer_index);
        self.data
    }

    fn grow(&mut self, additional: usize) {
        let required = self.writer_index + additional;
        if required <= self.data.len() {
            return;
        }
        let doubled = (self.data.len() * 2).max(MIN_GROW);
        self.data.resize(doubled.max(required), 0);
    }

    fn check_readable(&self, needed: usize) -> Result<(), BufferError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(BufferError::Underflow {
                needed,
                remaining,
                offset: self.reader_index,
            });
        }
        Ok(())
    }

    #[inline]
    fn put<const N: usize>(&mut self, bytes: [u8; N]) {
        self.grow(N);
        self.data[self.writer_index..self.writer_index + N].copy_from_slice(&bytes);
        self.writer_index += N;
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check_readable(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.reader_index..self.reader_index + N]);
        self.reader_index += N;
        Ok(bytes)
    }

    // ------------------------------------------------------------------ write

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.put([value]);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.put(value.to_le_bytes());
    }

    /// Writes `1` for `true` and `0` for `false`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.put([value as u8]);
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.put(value.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.put(value.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.put(value.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.put(value.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.put(value.to_le_bytes());
    }

    /// Copies `bytes` in at the writer index.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.grow(bytes.len());
        self.data[self.writer_index..self.writer_index + bytes.len()].copy_from_slice(bytes);
        self.writer_index += bytes.len();
    }

    /// Writes an unsigned LEB128 varint (1 to 5 bytes).
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(value as u64);
    }

    /// Writes an unsigned LEB128 varint (1 to 10 bytes).
    pub fn write_var_u64(&mut self, mut value: u64) {
        self.grow(10);
        while value >= 0x80 {
            self.data[self.writer_index] = (value as u8) | 0x80;
            self.writer_index += 1;
            value >>= 7;
        }
        self.data[self.writer_index] = value as u8;
        self.writer_index += 1;
    }

    /// Writes a zig-zag encoded signed varint.
    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_u32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Writes a zig-zag encoded signed varint.
    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(((value << 1) ^ (value >> 63)) as u64);
    }

    // ------------------------------------------------------------------- read

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, BufferError> {
        Ok(self.take::<1>()?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, BufferError> {
        Ok(i8::from_le_bytes(self.take()?))
    }

    /// Reads one byte as a bool; any non-zero byte is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, BufferError> {
        Ok(self.read_u8()? != 0)
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, BufferError> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, BufferError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, BufferError> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, BufferError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, BufferError> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    /// Fills `dest` completely from the reader index.
    pub fn read_bytes(&mut self, dest: &mut [u8]) -> Result<(), BufferError> {
        dest.copy_from_slice(self.read_slice(dest.len())?);
        Ok(())
    }

    /// Reads `len` bytes into a new vector.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        Ok(self.read_slice(len)?.to_vec())
    }

    /// Returns a view of the next `len` bytes and advances past them.
    pub fn read_slice(&mut self, len: usize) -> Result<&[u8], BufferError> {
        self.check_readable(len)?;
        let start = self.reader_index;
        self.reader_index += len;
        Ok(&self.data[start..start + len])
    }

    /// Reads an unsigned LEB128 varint of at most 5 bytes.
    pub fn read_var_u32(&mut self) -> Result<u32, BufferError> {
        let offset = self.reader_index;
        let value = self.read_varint(5)?;
        u32::try_from(value).map_err(|_| {
            self.reader_index = offset;
            BufferError::MalformedVarint { offset }
        })
    }

    /// Reads an unsigned LEB128 varint of at most 10 bytes.
    pub fn read_var_u64(&mut self) -> Result<u64, BufferError> {
        self.read_varint(10)
    }

    pub fn read_var_i32(&mut self) -> Result<i32, BufferError> {
        let raw = self.read_var_u32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }

    pub fn read_var_i64(&mut self) -> Result<i64, BufferError> {
        let raw = self.read_var_u64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    fn read_varint(&mut self, max_bytes: usize) -> Result<u64, BufferError> {
        let offset = self.reader_index;
        let available = self.remaining();
        let mut value: u64 = 0;
        for i in 0..max_bytes.min(available) {
            let byte = self.data[offset + i];
            let bits = (byte & 0x7f) as u64;
            let shift = 7 * i as u32;
            if shift == 63 && bits > 1 {
                return Err(BufferError::MalformedVarint { offset });
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                self.reader_index += i + 1;
                return Ok(value);
            }
        }
        if available < max_bytes {
            return Err(BufferError::Underflow {
                needed: available + 1,
                remaining: available,
                offset,
            });
        }
        Err(BufferError::MalformedVarint { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut buffer = Buffer::new();
        buffer.write_i32(0x0102_0304);
        assert_eq!(buffer.as_slice(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_grows_by_doubling() {
        let mut buffer = Buffer::with_capacity(4);
        buffer.write_i32(1);
        assert_eq!(buffer.capacity(), 4);
        buffer.write_u8(2);
        assert!(buffer.capacity() >= 8);
        assert_eq!(buffer.writer_index(), 5);
    }

    #[test]
    fn test_large_write_grows_to_fit() {
        let mut buffer = Buffer::with_capacity(2);
        buffer.write_bytes(&[7u8; 300]);
        assert!(buffer.capacity() >= 300);
        assert_eq!(buffer.remaining(), 300);
    }

    #[test]
    fn test_failed_read_keeps_cursor() {
        let mut buffer = Buffer::from_bytes(&[1, 2, 3]);
        assert_eq!(
            buffer.read_i32(),
            Err(BufferError::Underflow {
                needed: 4,
                remaining: 3,
                offset: 0
            })
        );
        assert_eq!(buffer.reader_index(), 0);
        assert_eq!(buffer.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_varint_widths() {
        let mut buffer = Buffer::new();
        buffer.write_var_u32(0);
        buffer.write_var_u32(127);
        buffer.write_var_u32(128);
        buffer.write_var_u32(u32::MAX);
        assert_eq!(buffer.writer_index(), 1 + 1 + 2 + 5);
        assert_eq!(buffer.read_var_u32().unwrap(), 0);
        assert_eq!(buffer.read_var_u32().unwrap(), 127);
        assert_eq!(buffer.read_var_u32().unwrap(), 128);
        assert_eq!(buffer.read_var_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn test_zigzag() {
        let mut buffer = Buffer::new();
        buffer.write_var_i32(-1);
        buffer.write_var_i64(i64::MIN);
        assert_eq!(buffer.as_slice()[0], 0x01);
        assert_eq!(buffer.read_var_i32().unwrap(), -1);
        assert_eq!(buffer.read_var_i64().unwrap(), i64::MIN);
    }

    #[test]
    fn test_varint_overlong() {
        let mut buffer = Buffer::from_bytes(&[0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        assert_eq!(
            buffer.read_var_u32(),
            Err(BufferError::MalformedVarint { offset: 0 })
        );
        assert_eq!(buffer.reader_index(), 0);
    }

    #[test]
    fn test_varint_truncated() {
        let mut buffer = Buffer::from_bytes(&[0x80, 0x80]);
        assert!(matches!(
            buffer.read_var_u64(),
            Err(BufferError::Underflow { offset: 0, .. })
        ));
    }

    #[test]
    fn test_var_u32_rejects_wide_value() {
        let mut buffer = Buffer::new();
        buffer.write_var_u64(u32::MAX as u64 + 1);
        assert_eq!(
            buffer.read_var_u32(),
            Err(BufferError::MalformedVarint { offset: 0 })
        );
    }

    #[test]
    fn test_increase_reader_index_bounds() {
        let mut buffer = Buffer::from_bytes(&[1, 2]);
        buffer.increase_reader_index(2).unwrap();
        assert!(buffer.increase_reader_index(1).is_err());
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_set_reader_index() {
        let mut buffer = Buffer::from_bytes(&[1, 2]);
        assert!(buffer.set_reader_index(3).is_err());
        buffer.set_reader_index(1).unwrap();
        assert_eq!(buffer.read_u8().unwrap(), 2);
    }

    #[test]
    fn test_into_vec_truncates_to_written() {
        let mut buffer = Buffer::with_capacity(32);
        buffer.write_bytes(b"abc");
        assert_eq!(buffer.into_vec(), b"abc".to_vec());
    }

    #[test]
    fn test_truncate() {
        let mut buffer = Buffer::from_bytes(&[1, 2, 3, 4]);
        buffer.increase_reader_index(3).unwrap();
        buffer.truncate(2);
        assert_eq!(buffer.as_slice(), &[1, 2]);
        assert_eq!(buffer.reader_index(), 2);
        buffer.truncate(10);
        assert_eq!(buffer.writer_index(), 2);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = Buffer::new();
        buffer.write_i64(9);
        let capacity = buffer.capacity();
        buffer.clear();
        assert_eq!(buffer.remaining(), 0);
        assert_eq!(buffer.capacity(), capacity);
    }
}
