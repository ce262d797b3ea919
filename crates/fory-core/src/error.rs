//! Serializer error type.

use fory_buffers::BufferError;
use thiserror::Error;

use crate::config::CompatibleMode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure aborts the current encode/decode call; nothing is retried
/// or patched up with defaults.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Read past the written bytes, malformed varint or bad text payload.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("type `{0}` is already registered")]
    DuplicateRegistration(String),
    #[error("cannot register `{0}`: registry is already in use")]
    RegistrationAfterUse(String),
    #[error("unknown type id {0}")]
    UnknownTypeId(u32),
    #[error("type `{0}` is not registered")]
    UnregisteredType(String),
    /// Schema-consistent decode of a struct body failed. Drift and
    /// corruption look the same here.
    #[error("schema mismatch in type id {type_id} (struct at offset {offset}): {source}")]
    SchemaMismatch {
        type_id: u32,
        offset: usize,
        #[source]
        source: Box<Error>,
    },
    #[error("type `{type_name}` declares field `{field}` twice")]
    DuplicateField { type_name: String, field: String },
    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: String, field: String },
    #[error("{context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: &'static str,
    },
    #[error("unknown field kind tag {0}")]
    UnknownKind(u32),
    #[error("stream was written in {found:?} mode, reader expects {expected:?}")]
    ModeMismatch {
        expected: CompatibleMode,
        found: CompatibleMode,
    },
    #[error("invalid header byte {0:#04x}")]
    InvalidHeader(u8),
    #[error("malformed payload at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
    /// A collection or struct is too large for its `var_u32` length prefix.
    #[error("length {0} does not fit a 32-bit length prefix")]
    LengthOverflow(usize),
    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),
    #[error("{0} trailing bytes after root value")]
    TrailingBytes(usize),
}

impl Error {
    /// Whether the root cause is a read past the end of the buffer.
    pub fn is_underflow(&self) -> bool {
        match self {
            Error::Buffer(BufferError::Underflow { .. }) => true,
            Error::SchemaMismatch { source, .. } => source.is_underflow(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underflow_seen_through_schema_mismatch() {
        let err = Error::SchemaMismatch {
            type_id: 64,
            offset: 1,
            source: Box::new(Error::Buffer(BufferError::Underflow {
                needed: 4,
                remaining: 0,
                offset: 9,
            })),
        };
        assert!(err.is_underflow());
        assert!(err.to_string().contains("type id 64"));
        assert!(!Error::UnknownTypeId(70).is_underflow());
    }
}
