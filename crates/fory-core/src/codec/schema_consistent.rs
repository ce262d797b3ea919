//! Schema-consistent struct layout: `[type-id][field-1]..[field-n]`.
//!
//! No names, no counts. Both ends must agree on the descriptor's field order
//! and types, so a reader with a drifted descriptor and a corrupted stream
//! fail the same way: some read in the struct body goes wrong. Every such
//! failure is reported as [`Error::SchemaMismatch`] for the innermost struct.

use super::encoder::{check_known_fields, field_value};
use super::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use crate::value::StructValue;

impl Encoder<'_> {
    pub(crate) fn write_consistent_fields(
        &mut self,
        descriptor: &TypeDescriptor,
        s: &StructValue,
    ) -> Result<()> {
        check_known_fields(descriptor, s)?;
        for field in &descriptor.fields {
            let value = field_value(descriptor, field, s)?;
            self.write_field(field.field_type.kind(), &value)?;
        }
        Ok(())
    }
}

impl Decoder<'_> {
    /// Reads a struct body whose id tag started at `offset`.
    pub(crate) fn read_consistent_struct(
        &mut self,
        type_id: u32,
        descriptor: &TypeDescriptor,
        offset: usize,
    ) -> Result<StructValue> {
        self.read_consistent_fields(descriptor)
            .map_err(|source| match source {
                Error::SchemaMismatch { .. } | Error::DepthExceeded(_) => source,
                source => Error::SchemaMismatch {
                    type_id,
                    offset,
                    source: Box::new(source),
                },
            })
    }

    fn read_consistent_fields(&mut self, descriptor: &TypeDescriptor) -> Result<StructValue> {
        let mut out = StructValue::new(descriptor.name.clone());
        out.fields.reserve(descriptor.fields.len());
        for field in &descriptor.fields {
            let value = self.read_field(field.field_type.kind())?;
            if !field.field_type.accepts(&value) {
                return Err(Error::TypeMismatch {
                    context: format!("{}.{}", descriptor.name, field.name),
                    expected: field.field_type.to_string(),
                    found: value.kind_name(),
                });
            }
            out.fields.insert(field.name.clone(), value);
        }
        Ok(out)
    }
}
