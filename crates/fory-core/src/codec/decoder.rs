//! Value decoder.

use fory_buffers::strings::{latin1_decode, utf16le_decode, utf8_decode};
use fory_buffers::Buffer;

use super::{coder, flag};
use crate::config::{CompatibleMode, Config};
use crate::error::{Error, Result};
use crate::registry::TypeRegistry;
use crate::types::tag;
use crate::value::Value;

/// Reads [`Value`] trees from a [`Buffer`], starting at its reader index.
pub struct Decoder<'a> {
    pub(crate) buffer: &'a mut Buffer,
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) config: &'a Config,
    depth: usize,
}

impl<'a> Decoder<'a> {
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

    /// Validates the header byte. Returns `true` for a null root.
    pub fn read_header(&mut self) -> Result<bool> {
        let bits = self.buffer.read_u8()?;
        if bits & !flag::KNOWN != 0 || bits & flag::LITTLE_ENDIAN == 0 {
            return Err(Error::InvalidHeader(bits));
        }
        let found = if bits & flag::COMPATIBLE != 0 {
            CompatibleMode::Compatible
        } else {
            CompatibleMode::SchemaConsistent
        };
        if found != self.config.mode {
            return Err(Error::ModeMismatch {
                expected: self.config.mode,
                found,
            });
        }
        Ok(bits & flag::NULL != 0)
    }

    /// Reads `[tag][payload]`.
    pub fn read_any(&mut self) -> Result<Value> {
        let offset = self.buffer.reader_index();
        let value_tag = self.buffer.read_var_u32()?;
        match value_tag {
            tag::NULL => Ok(Value::Null),
            tag::BOOL..=tag::FLOAT64 => self.read_primitive(value_tag),
            tag::STRING => Ok(Value::Str(self.read_text()?)),
            tag::BINARY => {
                let len = self.buffer.read_var_u32()? as usize;
                Ok(Value::Binary(self.buffer.read_vec(len)?))
            }
            tag::LIST => {
                self.enter()?;
                let len = self.buffer.read_var_u32()? as usize;
                // Every element takes at least one byte.
                let mut items = Vec::with_capacity(len.min(self.buffer.remaining()));
                for _ in 0..len {
                    items.push(self.read_any()?);
                }
                self.leave();
                Ok(Value::List(items))
            }
            tag::MAP => {
                self.enter()?;
                let len = self.buffer.read_var_u32()? as usize;
                let mut entries = Vec::with_capacity(len.min(self.buffer.remaining() / 2));
                for _ in 0..len {
                    let key = self.read_any()?;
                    let value = self.read_any()?;
                    entries.push((key, value));
                }
                self.leave();
                Ok(Value::Map(entries))
            }
            tag::NAMED_STRUCT if self.config.is_compatible() => {
                self.enter()?;
                let s = self.read_named_struct()?;
                self.leave();
                Ok(Value::Struct(s))
            }
            id if id >= tag::FIRST_USER_TYPE_ID => self.read_struct(id, offset),
            other => Err(Error::UnknownTypeId(other)),
        }
    }

    /// Reads a text payload (header plus bytes).
    pub fn read_text(&mut self) -> Result<String> {
        let offset = self.buffer.reader_index();
        let header = self.buffer.read_var_u64()?;
        let len = usize::try_from(header >> 2).map_err(|_| Error::Malformed {
            offset,
            reason: "text length overflows usize",
        })?;
        let bytes = self.buffer.read_slice(len)?;
        let text = match header & 0b11 {
            coder::LATIN1 => latin1_decode(bytes),
            coder::UTF16 => utf16le_decode(bytes)?,
            coder::UTF8 => utf8_decode(bytes)?,
            _ => {
                return Err(Error::Malformed {
                    offset,
                    reason: "unknown text coder",
                })
            }
        };
        Ok(text)
    }

    /// Reads a primitive payload of the given kind, without a tag.
    fn read_primitive(&mut self, kind: u32) -> Result<Value> {
        let value = match kind {
            tag::BOOL => {
                let offset = self.buffer.reader_index();
                match self.buffer.read_u8()? {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    _ => {
                        return Err(Error::Malformed {
                            offset,
                            reason: "bool byte is neither 0 nor 1",
                        })
                    }
                }
            }
            tag::INT8 => Value::Int8(self.buffer.read_i8()?),
            tag::INT16 => Value::Int16(self.buffer.read_i16()?),
            tag::INT32 => Value::Int32(self.buffer.read_i32()?),
            tag::INT64 => Value::Int64(self.buffer.read_i64()?),
            tag::FLOAT32 => Value::Float32(self.buffer.read_f32()?),
            tag::FLOAT64 => Value::Float64(self.buffer.read_f64()?),
            other => return Err(Error::UnknownKind(other)),
        };
        Ok(value)
    }

    /// Field payload for `kind`: raw for primitive kinds, tagged otherwise.
    pub(crate) fn read_field(&mut self, kind: u32) -> Result<Value> {
        match kind {
            tag::BOOL..=tag::FLOAT64 => self.read_primitive(kind),
            tag::STRING | tag::BINARY | tag::LIST | tag::MAP | tag::STRUCT | tag::ANY => {
                self.read_any()
            }
            other => Err(Error::UnknownKind(other)),
        }
    }

    fn read_struct(&mut self, type_id: u32, offset: usize) -> Result<Value> {
        self.enter()?;
        let registry = self.registry;
        let s = match (self.config.mode, registry.resolve_by_id(type_id)) {
            (CompatibleMode::SchemaConsistent, Ok(descriptor)) => {
                self.read_consistent_struct(type_id, descriptor, offset)?
            }
            (CompatibleMode::Compatible, Ok(descriptor)) => {
                self.read_compatible_fields(descriptor)?
            }
            (CompatibleMode::Compatible, Err(Error::UnknownTypeId(_)))
                if !self.config.require_registration =>
            {
                self.read_anonymous_struct(type_id)?
            }
            (_, Err(e)) => return Err(e),
        };
        self.leave();
        Ok(Value::Struct(s))
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
