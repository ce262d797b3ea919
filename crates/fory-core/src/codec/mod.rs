//! Value codec: dispatch plus the two struct layouts.
//!
//! Stream layout: one header byte, then the root value as
//! `[tag: var_u32][payload]`. Struct payloads depend on the session mode and
//! live in [`schema_consistent`] and [`compatible`].

mod compatible;
mod decoder;
mod encoder;
mod schema_consistent;

pub use decoder::Decoder;
pub use encoder::Encoder;

/// Size of the stream header.
pub const HEADER_SIZE: usize = 1;

/// Header bits.
pub mod flag {
    pub const NULL: u8 = 0b001;
    pub const LITTLE_ENDIAN: u8 = 0b010;
    pub const COMPATIBLE: u8 = 0b100;
    pub(crate) const KNOWN: u8 = NULL | LITTLE_ENDIAN | COMPATIBLE;
}

/// Text coder stored in the low two bits of a text header.
pub mod coder {
    pub const LATIN1: u64 = 0;
    pub const UTF16: u64 = 1;
    pub const UTF8: u64 = 2;
}
