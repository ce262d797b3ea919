//! Binary buffer utilities for fory.
//!
//! This crate provides the byte-level layer the serializer is built on.
//!
//! # Overview
//!
//! - [`Buffer`] - Growable byte region with independent read and write cursors
//! - [`BufferInputStream`] - Sequential byte-stream view over a [`Buffer`]
//! - [`strings`] - Latin-1 / UTF-16 / UTF-8 text helpers
//!
//! All fixed-width values are little-endian. Variable-width integers use
//! unsigned LEB128, with zig-zag mapping for the signed variants.
//!
//! # Example
//!
//! ```
//! use fory_buffers::Buffer;
//!
//! let mut buffer = Buffer::new();
//! buffer.write_u8(0x01);
//! buffer.write_i32(-2);
//! buffer.write_var_u32(300);
//!
//! assert_eq!(buffer.read_u8().unwrap(), 0x01);
//! assert_eq!(buffer.read_i32().unwrap(), -2);
//! assert_eq!(buffer.read_var_u32().unwrap(), 300);
//! assert_eq!(buffer.remaining(), 0);
//! ```

mod buffer;
mod print_octets;
mod stream;
pub mod strings;

pub use buffer::Buffer;
pub use print_octets::print_octets;
pub use stream::BufferInputStream;

use thiserror::Error;

/// Error type for buffer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the writer index.
    #[error("buffer underflow: need {needed} bytes at offset {offset}, {remaining} remaining")]
    Underflow {
        needed: usize,
        remaining: usize,
        offset: usize,
    },
    /// A varint ran past its maximum width.
    #[error("malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },
    /// Attempted to move the reader past the writer.
    #[error("reader index {index} is past writer index {writer_index}")]
    ReaderIndexOutOfBounds { index: usize, writer_index: usize },
    /// Invalid UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// Odd byte count or unpaired surrogate in UTF-16 data.
    #[error("invalid UTF-16 sequence")]
    InvalidUtf16,
}
