//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON cannot carry struct names or integer widths, so the mapping is lossy
//! in both directions:
//!
//! * integers become JSON numbers; JSON integers come back as `Int64`
//!   (or `Float64` when they only fit `u64`), other numbers as `Float64`;
//! * non-finite floats become `null`;
//! * `Binary` becomes an array of byte numbers;
//! * maps with only string keys become objects, other maps become arrays of
//!   `[key, value]` pairs; JSON objects come back as string-keyed maps;
//! * structs become objects of their fields.

use serde_json::{Map as JsonMap, Number};

use crate::error::{Error, Result};
use crate::value::{StructValue, Value};

pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int8(n) => (*n).into(),
        Value::Int16(n) => (*n).into(),
        Value::Int32(n) => (*n).into(),
        Value::Int64(n) => (*n).into(),
        Value::Float32(f) => float(f64::from(*f)),
        Value::Float64(f) => float(*f),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Binary(bytes) => {
            serde_json::Value::Array(bytes.iter().map(|b| (*b).into()).collect())
        }
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => {
            if entries.iter().all(|(k, _)| k.as_str().is_some()) {
                let mut obj = JsonMap::with_capacity(entries.len());
                for (key, value) in entries {
                    if let Value::Str(key) = key {
                        obj.insert(key.clone(), to_json(value));
                    }
                }
                serde_json::Value::Object(obj)
            } else {
                serde_json::Value::Array(
                    entries
                        .iter()
                        .map(|(k, v)| serde_json::Value::Array(vec![to_json(k), to_json(v)]))
                        .collect(),
                )
            }
        }
        Value::Struct(s) => serde_json::Value::Object(
            s.fields
                .iter()
                .map(|(name, value)| (name.clone(), to_json(value)))
                .collect(),
        ),
    }
}

fn float(f: f64) -> serde_json::Value {
    Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else {
                Value::Float64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(obj) => Value::Map(
            obj.iter()
                .map(|(key, value)| (Value::Str(key.clone()), from_json(value)))
                .collect(),
        ),
    }
}

/// Builds a struct named `type_name` from a JSON object, one field per key.
pub fn struct_from_json(type_name: &str, json: &serde_json::Value) -> Result<StructValue> {
    let serde_json::Value::Object(obj) = json else {
        return Err(Error::TypeMismatch {
            context: type_name.to_string(),
            expected: "object".into(),
            found: json_kind(json),
        });
    };
    let mut out = StructValue::new(type_name);
    for (name, value) in obj {
        out.fields.insert(name.clone(), from_json(value));
    }
    Ok(out)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        to_json(value)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        from_json(json)
    }
}
