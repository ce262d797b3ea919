//! Engine entry point.

use fory_buffers::{print_octets, Buffer};
use tracing::trace;

use crate::codec::{Decoder, Encoder, HEADER_SIZE};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::TypeRegistry;
use crate::types::TypeDescriptor;
use crate::value::Value;

/// A serializer session: one configuration plus the types registered for it.
///
/// Register every struct type first, then share the instance (it is
/// `Send + Sync`) across as many encode/decode calls as needed. The first
/// call freezes the registry.
///
/// ```
/// use fory_core::{CompatibleMode, Config, FieldType, Fory, StructValue, TypeDescriptor};
///
/// let mut fory = Fory::new(Config::default().with_mode(CompatibleMode::Compatible));
/// fory.register(TypeDescriptor::new("CustomObject").field("str", FieldType::String))
///     .unwrap();
///
/// let value = StructValue::new("CustomObject").with("str", "hello").into();
/// let bytes = fory.serialize(&value).unwrap();
/// assert_eq!(fory.deserialize(&bytes).unwrap(), value);
/// ```
#[derive(Debug, Default)]
pub struct Fory {
    config: Config,
    registry: TypeRegistry,
}

impl Fory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Registers a struct type and returns its wire id.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<u32> {
        self.registry.register(descriptor)
    }

    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buffer = Buffer::with_capacity(self.config.initial_capacity);
        self.serialize_into(value, &mut buffer)?;
        let bytes = buffer.into_vec();
        trace!(
            mode = ?self.config.mode,
            len = bytes.len(),
            bytes = %print_octets(&bytes, 32),
            "serialized value"
        );
        Ok(bytes)
    }

    /// Appends one serialized value to `buffer`. On failure the buffer is
    /// rolled back to its previous writer index.
    pub fn serialize_into(&self, value: &Value, buffer: &mut Buffer) -> Result<()> {
        let start = buffer.writer_index();
        let mut encoder = Encoder::new(buffer, &self.registry, &self.config);
        encoder.write_header(value.is_null());
        let result = match value {
            Value::Null => Ok(()),
            value => encoder.write_any(value),
        };
        if result.is_err() {
            buffer.truncate(start);
        }
        result
    }

    /// Decodes exactly one value; trailing bytes are an error.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut buffer = Buffer::from_bytes(bytes);
        let value = self.deserialize_from(&mut buffer)?;
        let trailing = buffer.remaining();
        if trailing == 0 {
            return Ok(value);
        }
        // Extra bytes after a schema-consistent struct mean the writer's
        // layout had more data than ours.
        if let (false, Value::Struct(s)) = (self.config.is_compatible(), &value) {
            if let Ok((type_id, _)) = self.registry.resolve_by_name(&s.type_name) {
                return Err(Error::SchemaMismatch {
                    type_id,
                    offset: HEADER_SIZE,
                    source: Box::new(Error::TrailingBytes(trailing)),
                });
            }
        }
        Err(Error::TrailingBytes(trailing))
    }

    /// Decodes one value starting at the buffer's reader index, leaving the
    /// cursor just past it.
    pub fn deserialize_from(&self, buffer: &mut Buffer) -> Result<Value> {
        let mut decoder = Decoder::new(buffer, &self.registry, &self.config);
        if decoder.read_header()? {
            return Ok(Value::Null);
        }
        decoder.read_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompatibleMode;
    use crate::types::FieldType;
    use crate::value::StructValue;

    #[test]
    fn test_null_root_is_header_only() {
        let fory = Fory::default();
        let bytes = fory.serialize(&Value::Null).unwrap();
        assert_eq!(bytes, vec![0b011]);
        assert_eq!(fory.deserialize(&bytes).unwrap(), Value::Null);
    }

    #[test]
    fn test_registration_frozen_after_first_call() {
        let mut fory = Fory::default();
        fory.register(TypeDescriptor::new("A")).unwrap();
        fory.serialize(&Value::Int8(1)).unwrap();
        assert_eq!(
            fory.register(TypeDescriptor::new("B")),
            Err(Error::RegistrationAfterUse("B".into()))
        );
    }

    #[test]
    fn test_registration_frozen_after_deserialize_alone() {
        let bytes = Fory::default().serialize(&Value::Int8(1)).unwrap();
        let mut fory = Fory::default();
        fory.register(TypeDescriptor::new("A")).unwrap();
        assert_eq!(fory.deserialize(&bytes).unwrap(), Value::Int8(1));
        assert_eq!(
            fory.register(TypeDescriptor::new("B")),
            Err(Error::RegistrationAfterUse("B".into()))
        );
    }

    #[test]
    fn test_failed_serialize_rolls_back() {
        let fory = Fory::default();
        let mut buffer = Buffer::new();
        buffer.write_u8(0xaa);
        let bad = Value::List(vec![StructValue::new("Ghost").into()]);
        assert!(fory.serialize_into(&bad, &mut buffer).is_err());
        assert_eq!(buffer.as_slice(), &[0xaa]);
    }

    #[test]
    fn test_values_back_to_back() {
        let fory = Fory::default();
        let mut buffer = Buffer::new();
        fory.serialize_into(&Value::from("a"), &mut buffer).unwrap();
        fory.serialize_into(&Value::Int64(2), &mut buffer).unwrap();
        assert_eq!(fory.deserialize_from(&mut buffer).unwrap(), Value::from("a"));
        assert_eq!(fory.deserialize_from(&mut buffer).unwrap(), Value::Int64(2));
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_trailing_bytes() {
        let fory = Fory::default();
        let mut bytes = fory.serialize(&Value::Int8(1)).unwrap();
        bytes.push(0);
        assert_eq!(fory.deserialize(&bytes), Err(Error::TrailingBytes(1)));
    }

    #[test]
    fn test_trailing_bytes_after_struct_is_schema_mismatch() {
        let mut fory = Fory::default();
        fory.register(TypeDescriptor::new("T").field("a", FieldType::Int8))
            .unwrap();
        let mut bytes = fory
            .serialize(&StructValue::new("T").with("a", 1i8).into())
            .unwrap();
        bytes.push(9);
        let err = fory.deserialize(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaMismatch {
                type_id: 64,
                offset: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_mode_mismatch_rejected() {
        let writer = Fory::new(Config::default().with_mode(CompatibleMode::Compatible));
        let bytes = writer.serialize(&Value::from("x")).unwrap();
        let err = Fory::default().deserialize(&bytes).unwrap_err();
        assert!(matches!(err, Error::ModeMismatch { .. }));
    }

    #[test]
    fn test_shared_across_threads() {
        let mut fory = Fory::default();
        fory.register(TypeDescriptor::new("T").field("n", FieldType::Int64))
            .unwrap();
        let fory = std::sync::Arc::new(fory);
        let handles: Vec<_> = (0..4i64)
            .map(|n| {
                let fory = std::sync::Arc::clone(&fory);
                std::thread::spawn(move || {
                    let value: Value = StructValue::new("T").with("n", n).into();
                    let bytes = fory.serialize(&value).unwrap();
                    assert_eq!(fory.deserialize(&bytes).unwrap(), value);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
