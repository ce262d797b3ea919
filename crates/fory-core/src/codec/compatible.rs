//! Compatible struct layout:
//! `[type-id][field-count][(name: text, kind: var_u32, value)]*`.
//!
//! Readers reconcile by field name against their own descriptor, so writer
//! and reader may add, drop or reorder fields independently. Unregistered
//! structs may be written as `[NAMED_STRUCT][type name][field-count][...]`
//! with kinds inferred from the values.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::encoder::{check_known_fields, field_value, wire_len};
use super::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::types::{tag, FieldType, TypeDescriptor};
use crate::value::{StructValue, Value};

impl Encoder<'_> {
    pub(crate) fn write_compatible_fields(
        &mut self,
        descriptor: &TypeDescriptor,
        s: &StructValue,
    ) -> Result<()> {
        check_known_fields(descriptor, s)?;
        self.buffer.write_var_u32(wire_len(descriptor.fields.len())?);
        for field in &descriptor.fields {
            let value = field_value(descriptor, field, s)?;
            let kind = field.field_type.kind();
            self.write_text(&field.name);
            self.buffer.write_var_u32(kind);
            self.write_field(kind, &value)?;
        }
        Ok(())
    }

    pub(crate) fn write_named_struct(&mut self, s: &StructValue) -> Result<()> {
        self.buffer.write_var_u32(tag::NAMED_STRUCT);
        self.write_text(&s.type_name);
        self.buffer.write_var_u32(wire_len(s.fields.len())?);
        for (name, value) in &s.fields {
            let kind = FieldType::kind_of(value);
            self.write_text(name);
            self.buffer.write_var_u32(kind);
            self.write_field(kind, value)?;
        }
        Ok(())
    }
}

impl Decoder<'_> {
    /// Reads `[field-count][entries]` and reconciles them with `descriptor`.
    ///
    /// Fields unknown to the descriptor are read and dropped. Fields whose
    /// kind changed are dropped and defaulted. Declared fields missing from
    /// the stream take their type default. The result lists fields in
    /// descriptor order.
    pub(crate) fn read_compatible_fields(
        &mut self,
        descriptor: &TypeDescriptor,
    ) -> Result<StructValue> {
        let count = self.buffer.read_var_u32()?;
        let mut incoming: IndexMap<String, Value> = IndexMap::new();
        for _ in 0..count {
            let name = self.read_text()?;
            let kind = self.buffer.read_var_u32()?;
            let value = self.read_field(kind)?;
            let Some(field) = descriptor.field_named(&name) else {
                debug!(
                    type_name = %descriptor.name,
                    field = %name,
                    "dropping field absent from local type"
                );
                continue;
            };
            let local = &field.field_type;
            if local.accepts(&value) {
                incoming.insert(name, value);
            } else if local.kind() == kind {
                return Err(Error::TypeMismatch {
                    context: format!("{}.{}", descriptor.name, name),
                    expected: local.to_string(),
                    found: value.kind_name(),
                });
            } else {
                warn!(
                    type_name = %descriptor.name,
                    field = %name,
                    local_kind = local.kind(),
                    stream_kind = kind,
                    "field kind changed, using default"
                );
            }
        }

        let mut out = StructValue::new(descriptor.name.clone());
        out.fields.reserve(descriptor.fields.len());
        for field in &descriptor.fields {
            let value = match incoming.swap_remove(&field.name) {
                Some(value) => value,
                None => {
                    debug!(
                        type_name = %descriptor.name,
                        field = %field.name,
                        "field absent from stream, using default"
                    );
                    field.field_type.default_value()
                }
            };
            out.fields.insert(field.name.clone(), value);
        }
        Ok(out)
    }

    /// Reads the body of a `NAMED_STRUCT` value.
    pub(crate) fn read_named_struct(&mut self) -> Result<StructValue> {
        let type_name = self.read_text()?;
        let registry = self.registry;
        match registry.resolve_by_name(&type_name) {
            Ok((_, descriptor)) => self.read_compatible_fields(descriptor),
            Err(_) if !self.config.require_registration => self.read_self_described(type_name),
            Err(e) => Err(e),
        }
    }

    /// Recovers a struct whose id this registry does not know, using the
    /// field schema embedded in the stream.
    pub(crate) fn read_anonymous_struct(&mut self, type_id: u32) -> Result<StructValue> {
        warn!(type_id, "unknown type id, recovering fields from embedded schema");
        self.read_self_described(String::new())
    }

    fn read_self_described(&mut self, type_name: String) -> Result<StructValue> {
        let count = self.buffer.read_var_u32()?;
        let mut out = StructValue::new(type_name);
        for _ in 0..count {
            let name = self.read_text()?;
            let kind = self.buffer.read_var_u32()?;
            let value = self.read_field(kind)?;
            out.fields.insert(name, value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use fory_buffers::Buffer;
    use tracing_test::traced_test;

    use super::*;
    use crate::config::{CompatibleMode, Config};
    use crate::registry::TypeRegistry;

    fn compatible() -> Config {
        Config::default().with_mode(CompatibleMode::Compatible)
    }

    fn registry_with(descriptor: TypeDescriptor) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(descriptor).unwrap();
        registry
    }

    fn encode(registry: &TypeRegistry, config: &Config, value: &Value) -> Buffer {
        let mut buffer = Buffer::new();
        Encoder::new(&mut buffer, registry, config)
            .write_any(value)
            .unwrap();
        buffer
    }

    #[test]
    fn test_layout() {
        let registry = registry_with(TypeDescriptor::new("T").field("a", FieldType::Int8));
        let buffer = encode(
            &registry,
            &compatible(),
            &StructValue::new("T").with("a", 5i8).into(),
        );
        assert_eq!(
            buffer.as_slice(),
            &[64, 1, 1 << 2, b'a', tag::INT8 as u8, 5]
        );
    }

    #[test]
    fn test_reordered_fields() {
        let writer = registry_with(
            TypeDescriptor::new("T")
                .field("b", FieldType::String)
                .field("a", FieldType::Int32),
        );
        let reader = registry_with(
            TypeDescriptor::new("T")
                .field("a", FieldType::Int32)
                .field("b", FieldType::String),
        );
        let config = compatible();
        let mut buffer = encode(
            &writer,
            &config,
            &StructValue::new("T").with("a", 1).with("b", "x").into(),
        );
        let value = Decoder::new(&mut buffer, &reader, &config)
            .read_any()
            .unwrap();
        let names: Vec<&String> = value.as_struct().unwrap().fields.keys().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_changed_kind_is_defaulted() {
        let writer = registry_with(TypeDescriptor::new("T").field("n", FieldType::Int32));
        let reader = registry_with(TypeDescriptor::new("T").field("n", FieldType::Int64));
        let config = compatible();
        let mut buffer = encode(&writer, &config, &StructValue::new("T").with("n", 9).into());
        let value = Decoder::new(&mut buffer, &reader, &config)
            .read_any()
            .unwrap();
        assert_eq!(value.as_struct().unwrap().get("n"), Some(&Value::Int64(0)));
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    #[traced_test]
    fn test_reconciliation_is_logged() {
        let writer = registry_with(
            TypeDescriptor::new("T")
                .field("n", FieldType::Int32)
                .field("gone", FieldType::Bool),
        );
        let reader = registry_with(
            TypeDescriptor::new("T")
                .field("n", FieldType::String)
                .field("new", FieldType::Bool),
        );
        let config = compatible();
        let mut buffer = encode(
            &writer,
            &config,
            &StructValue::new("T").with("n", 1).with("gone", true).into(),
        );
        Decoder::new(&mut buffer, &reader, &config)
            .read_any()
            .unwrap();
        assert!(logs_contain("field kind changed, using default"));
        assert!(logs_contain("dropping field absent from local type"));
        assert!(logs_contain("field absent from stream, using default"));
    }

    #[test]
    fn test_same_kind_incompatible_elements_rejected() {
        let writer = registry_with(
            TypeDescriptor::new("T").field("xs", FieldType::list(FieldType::Int32)),
        );
        let reader = registry_with(
            TypeDescriptor::new("T").field("xs", FieldType::list(FieldType::String)),
        );
        let config = compatible();
        let mut buffer = encode(
            &writer,
            &config,
            &StructValue::new("T")
                .with("xs", Value::List(vec![Value::Int32(1)]))
                .into(),
        );
        let err = Decoder::new(&mut buffer, &reader, &config)
            .read_any()
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_id_recovered_when_registration_optional() {
        let writer = registry_with(TypeDescriptor::new("T").field("a", FieldType::String));
        let config = compatible().with_require_registration(false);
        let mut buffer = encode(&writer, &config, &StructValue::new("T").with("a", "v").into());
        let value = Decoder::new(&mut buffer, &TypeRegistry::new(), &config)
            .read_any()
            .unwrap();
        let s = value.as_struct().unwrap();
        assert!(s.is_anonymous());
        assert_eq!(s.get("a"), Some(&Value::from("v")));
    }

    #[test]
    fn test_unknown_id_rejected_when_registration_required() {
        let writer = registry_with(TypeDescriptor::new("T"));
        let config = compatible();
        let mut buffer = encode(&writer, &config, &StructValue::new("T").into());
        let err = Decoder::new(&mut buffer, &TypeRegistry::new(), &config)
            .read_any()
            .unwrap_err();
        assert_eq!(err, Error::UnknownTypeId(64));
    }

    #[test]
    fn test_named_struct_reconciled_with_local_registration() {
        let config = compatible().with_require_registration(false);
        let mut buffer = encode(
            &TypeRegistry::new(),
            &config,
            &StructValue::new("T").with("a", 1).with("extra", true).into(),
        );
        assert_eq!(buffer.as_slice()[0], tag::NAMED_STRUCT as u8);
        let reader = registry_with(
            TypeDescriptor::new("T")
                .field("a", FieldType::Int32)
                .field("b", FieldType::Float64),
        );
        let value = Decoder::new(&mut buffer, &reader, &config)
            .read_any()
            .unwrap();
        assert_eq!(
            value,
            StructValue::new("T").with("a", 1).with("b", 0.0f64).into()
        );
    }

    #[test]
    fn test_named_struct_unknown_locally() {
        let config = compatible().with_require_registration(false);
        let original: Value = StructValue::new("Free")
            .with("n", Value::Null)
            .with("tags", Value::str_list(["x"]))
            .into();
        let mut buffer = encode(&TypeRegistry::new(), &config, &original);
        let value = Decoder::new(&mut buffer, &TypeRegistry::new(), &config)
            .read_any()
            .unwrap();
        assert_eq!(value, original);
    }
}
