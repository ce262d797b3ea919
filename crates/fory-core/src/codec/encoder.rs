//! Value encoder.

use std::borrow::Cow;

use fory_buffers::strings::{is_latin1, latin1_encode, utf16le_encode};
use fory_buffers::Buffer;

use super::{coder, flag};
use crate::config::{CompatibleMode, Config};
use crate::error::{Error, Result};
use crate::registry::TypeRegistry;
use crate::types::{tag, FieldDescriptor, FieldType, TypeDescriptor};
use crate::value::{StructValue, Value};

/// Writes [`Value`] trees into a caller-owned [`Buffer`].
///
/// Primitive, text and collection codecs are fixed; structs are looked up in
/// the registry and laid out according to the session mode.
pub struct Encoder<'a> {
    pub(crate) buffer: &'a mut Buffer,
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) config: &'a Config,
    depth: usize,
}

impl<'a> Encoder<'a> {
    /// Freezes `registry`: no types can be registered once a codec has
    /// been built over it.
    pub fn new(buffer: &'a mut Buffer, registry: &'a TypeRegistry, config: &'a Config) -> Self {
        registry.mark_used();
        Self {
            buffer,
            registry,
            config,
            depth: 0,
        }
    }

    pub fn write_header(&mut self, root_is_null: bool) {
        let mut bits = flag::LITTLE_ENDIAN;
        if root_is_null {
            bits |= flag::NULL;
        }
        if self.config.is_compatible() {
            bits |= flag::COMPATIBLE;
        }
        self.buffer.write_u8(bits);
    }

    /// Writes `[tag][payload]`.
    pub fn write_any(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.buffer.write_var_u32(tag::NULL),
            Value::Bool(_)
            | Value::Int8(_)
            | Value::Int16(_)
            | Value::Int32(_)
            | Value::Int64(_)
            | Value::Float32(_)
            | Value::Float64(_) => {
                self.buffer.write_var_u32(FieldType::kind_of(value));
                self.write_primitive(value)?;
            }
            Value::Str(s) => {
                self.buffer.write_var_u32(tag::STRING);
                self.write_text(s);
            }
            Value::Binary(bytes) => {
                self.buffer.write_var_u32(tag::BINARY);
                self.buffer.write_var_u32(wire_len(bytes.len())?);
                self.buffer.write_bytes(bytes);
            }
            Value::List(items) => {
                self.enter()?;
                self.buffer.write_var_u32(tag::LIST);
                self.buffer.write_var_u32(wire_len(items.len())?);
                for item in items {
                    self.write_any(item)?;
                }
                self.leave();
            }
            Value::Map(entries) => {
                self.enter()?;
                self.buffer.write_var_u32(tag::MAP);
                self.buffer.write_var_u32(wire_len(entries.len())?);
                for (key, value) in entries {
                    self.write_any(key)?;
                    self.write_any(value)?;
                }
                self.leave();
            }
            Value::Struct(s) => self.write_struct(s)?,
        }
        Ok(())
    }

    /// Writes `[var_u64: byte_len << 2 | coder][bytes]`.
    ///
    /// Latin-1 when every char fits one byte, UTF-16LE otherwise. The choice
    /// depends only on the text, so equal strings always encode identically.
    pub fn write_text(&mut self, s: &str) {
        let (bytes, text_coder) = if is_latin1(s) {
            (latin1_encode(s), coder::LATIN1)
        } else {
            (utf16le_encode(s), coder::UTF16)
        };
        self.buffer
            .write_var_u64(((bytes.len() as u64) << 2) | text_coder);
        self.buffer.write_bytes(&bytes);
    }

    /// Writes a primitive payload without its tag.
    fn write_primitive(&mut self, value: &Value) -> Result<()> {
        match *value {
            Value::Bool(v) => self.buffer.write_bool(v),
            Value::Int8(v) => self.buffer.write_i8(v),
            Value::Int16(v) => self.buffer.write_i16(v),
            Value::Int32(v) => self.buffer.write_i32(v),
            Value::Int64(v) => self.buffer.write_i64(v),
            Value::Float32(v) => self.buffer.write_f32(v),
            Value::Float64(v) => self.buffer.write_f64(v),
            _ => {
                return Err(Error::TypeMismatch {
                    context: "primitive payload".into(),
                    expected: "primitive".into(),
                    found: value.kind_name(),
                })
            }
        }
        Ok(())
    }

    /// Field payload for `kind`: raw for primitive kinds, tagged otherwise.
    pub(crate) fn write_field(&mut self, kind: u32, value: &Value) -> Result<()> {
        if tag::is_primitive(kind) {
            self.write_primitive(value)
        } else {
            self.write_any(value)
        }
    }

    fn write_struct(&mut self, s: &StructValue) -> Result<()> {
        self.enter()?;
        let registry = self.registry;
        match registry.resolve_by_name(&s.type_name) {
            Ok((id, descriptor)) => {
                self.buffer.write_var_u32(id);
                match self.config.mode {
                    CompatibleMode::SchemaConsistent => {
                        self.write_consistent_fields(descriptor, s)?
                    }
                    CompatibleMode::Compatible => self.write_compatible_fields(descriptor, s)?,
                }
            }
            Err(Error::UnregisteredType(_)) if self.config.allows_unregistered() => {
                self.write_named_struct(s)?
            }
            Err(e) => return Err(e),
        }
        self.leave();
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// Collection lengths and field counts go on the wire as `var_u32`.
pub(crate) fn wire_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::LengthOverflow(len))
}

/// Rejects fields the descriptor does not declare.
pub(crate) fn check_known_fields(descriptor: &TypeDescriptor, s: &StructValue) -> Result<()> {
    match s
        .fields
        .keys()
        .find(|name| descriptor.field_named(name).is_none())
    {
        Some(name) => Err(Error::UnknownField {
            type_name: descriptor.name.clone(),
            field: name.clone(),
        }),
        None => Ok(()),
    }
}

/// The value to write for `field`, falling back to the type default.
pub(crate) fn field_value<'s>(
    descriptor: &TypeDescriptor,
    field: &FieldDescriptor,
    s: &'s StructValue,
) -> Result<Cow<'s, Value>> {
    let value = match s.get(&field.name) {
        Some(value) => Cow::Borrowed(value),
        None => Cow::Owned(field.field_type.default_value()),
    };
    if !field.field_type.accepts(&value) {
        return Err(Error::TypeMismatch {
            context: format!("{}.{}", descriptor.name, field.name),
            expected: field.field_type.to_string(),
            found: value.kind_name(),
        });
    }
    Ok(value)
}
