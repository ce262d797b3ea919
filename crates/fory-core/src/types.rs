//! Wire tags and type descriptors.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Frozen tag space. Changing any value breaks every stored stream.
pub mod tag {
    pub const NULL: u32 = 0;
    pub const BOOL: u32 = 1;
    pub const INT8: u32 = 2;
    pub const INT16: u32 = 3;
    pub const INT32: u32 = 4;
    pub const INT64: u32 = 5;
    pub const FLOAT32: u32 = 6;
    pub const FLOAT64: u32 = 7;
    pub const STRING: u32 = 8;
    pub const BINARY: u32 = 9;
    pub const LIST: u32 = 10;
    pub const MAP: u32 = 11;
    /// Field kind only; struct values carry their registered id.
    pub const STRUCT: u32 = 12;
    /// Self-describing struct, compatible mode only.
    pub const NAMED_STRUCT: u32 = 13;
    /// Field kind only.
    pub const ANY: u32 = 14;

    /// First id handed out by the registry.
    pub const FIRST_USER_TYPE_ID: u32 = 64;

    /// Kinds whose field payload is written raw, without a value tag.
    pub fn is_primitive(kind: u32) -> bool {
        (BOOL..=FLOAT64).contains(&kind)
    }
}

/// Declared type of a struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Binary,
    List(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
    /// A registered struct, by type name.
    Struct(String),
    Any,
}

impl FieldType {
    pub fn list(elem: FieldType) -> Self {
        FieldType::List(Box::new(elem))
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map(Box::new(key), Box::new(value))
    }

    pub fn struct_of(name: impl Into<String>) -> Self {
        FieldType::Struct(name.into())
    }

    /// Kind tag written next to the field name in compatible mode.
    pub fn kind(&self) -> u32 {
        match self {
            FieldType::Bool => tag::BOOL,
            FieldType::Int8 => tag::INT8,
            FieldType::Int16 => tag::INT16,
            FieldType::Int32 => tag::INT32,
            FieldType::Int64 => tag::INT64,
            FieldType::Float32 => tag::FLOAT32,
            FieldType::Float64 => tag::FLOAT64,
            FieldType::String => tag::STRING,
            FieldType::Binary => tag::BINARY,
            FieldType::List(_) => tag::LIST,
            FieldType::Map(..) => tag::MAP,
            FieldType::Struct(_) => tag::STRUCT,
            FieldType::Any => tag::ANY,
        }
    }

    pub fn is_primitive(&self) -> bool {
        tag::is_primitive(self.kind())
    }

    /// Value a reader uses when the stream does not carry the field.
    pub fn default_value(&self) -> Value {
        match self {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int8 => Value::Int8(0),
            FieldType::Int16 => Value::Int16(0),
            FieldType::Int32 => Value::Int32(0),
            FieldType::Int64 => Value::Int64(0),
            FieldType::Float32 => Value::Float32(0.0),
            FieldType::Float64 => Value::Float64(0.0),
            _ => Value::Null,
        }
    }

    /// Whether `value` may be stored in a field of this type.
    ///
    /// Null is accepted for every non-primitive type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Any, _) => true,
            (t, Value::Null) => !t.is_primitive(),
            (FieldType::Bool, Value::Bool(_))
            | (FieldType::Int8, Value::Int8(_))
            | (FieldType::Int16, Value::Int16(_))
            | (FieldType::Int32, Value::Int32(_))
            | (FieldType::Int64, Value::Int64(_))
            | (FieldType::Float32, Value::Float32(_))
            | (FieldType::Float64, Value::Float64(_))
            | (FieldType::String, Value::Str(_))
            | (FieldType::Binary, Value::Binary(_)) => true,
            (FieldType::List(elem), Value::List(items)) => items.iter().all(|v| elem.accepts(v)),
            (FieldType::Map(k, v), Value::Map(entries)) => entries
                .iter()
                .all(|(key, value)| k.accepts(key) && v.accepts(value)),
            (FieldType::Struct(name), Value::Struct(s)) => s.type_name == *name,
            _ => false,
        }
    }

    /// Kind of a field inferred from a value, for self-describing structs.
    pub(crate) fn kind_of(value: &Value) -> u32 {
        match value {
            Value::Null => tag::ANY,
            Value::Bool(_) => tag::BOOL,
            Value::Int8(_) => tag::INT8,
            Value::Int16(_) => tag::INT16,
            Value::Int32(_) => tag::INT32,
            Value::Int64(_) => tag::INT64,
            Value::Float32(_) => tag::FLOAT32,
            Value::Float64(_) => tag::FLOAT64,
            Value::Str(_) => tag::STRING,
            Value::Binary(_) => tag::BINARY,
            Value::List(_) => tag::LIST,
            Value::Map(_) => tag::MAP,
            Value::Struct(_) => tag::STRUCT,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int8 => f.write_str("int8"),
            FieldType::Int16 => f.write_str("int16"),
            FieldType::Int32 => f.write_str("int32"),
            FieldType::Int64 => f.write_str("int64"),
            FieldType::Float32 => f.write_str("float32"),
            FieldType::Float64 => f.write_str("float64"),
            FieldType::String => f.write_str("string"),
            FieldType::Binary => f.write_str("binary"),
            FieldType::List(elem) => write!(f, "list<{elem}>"),
            FieldType::Map(k, v) => write!(f, "map<{k}, {v}>"),
            FieldType::Struct(name) => write!(f, "struct {name}"),
            FieldType::Any => f.write_str("any"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

/// Layout of a composite record type: a name and an ordered field list.
///
/// In schema-consistent mode the field order *is* the wire layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            field_type,
        });
        self
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::DuplicateField {
                    type_name: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}
