//! Dual-mode binary object serialization.
//!
//! Values are explicit [`Value`] trees; struct types are described once with
//! [`TypeDescriptor`] and registered on a [`Fory`] session, which assigns
//! each a wire id starting at [`tag::FIRST_USER_TYPE_ID`].
//!
//! Two contracts, fixed per session by [`CompatibleMode`]:
//!
//! - `SchemaConsistent`: struct fields are written in descriptor order with
//!   no names or counts. Writer and reader must share the descriptor.
//! - `Compatible`: every struct field carries its name and kind tag, so
//!   readers tolerate added, removed and reordered fields.
//!
//! ```
//! use fory_core::{Config, FieldType, Fory, StructValue, TypeDescriptor, Value};
//!
//! let mut fory = Fory::new(Config::default());
//! fory.register(TypeDescriptor::new("Greeting").field("words", FieldType::list(FieldType::String)))
//!     .unwrap();
//!
//! let value: Value = StructValue::new("Greeting")
//!     .with("words", Value::str_list(["Hello", "Hello，你好"]))
//!     .into();
//! let bytes = fory.serialize(&value).unwrap();
//! assert_eq!(fory.deserialize(&bytes).unwrap(), value);
//! ```

pub mod codec;
mod config;
mod convert;
mod error;
mod fory;
mod registry;
mod types;
mod value;

pub use codec::{Decoder, Encoder};
pub use config::{CompatibleMode, Config};
pub use convert::{from_json, struct_from_json, to_json};
pub use error::{Error, Result};
pub use fory::Fory;
pub use registry::TypeRegistry;
pub use types::{tag, FieldDescriptor, FieldType, TypeDescriptor};
pub use value::{StructValue, Value};

pub use fory_buffers::{Buffer, BufferError, BufferInputStream};
