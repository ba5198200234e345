//! Layout-driven decoding: message fields described in JSON instead of code.
//!
//! A layout file pairs an opcode table with an ordered field list per message:
//!
//! ```text
//! {
//!   "opcodes":  { "17": "position", "49": "leaderboard_entry" },
//!   "messages": {
//!     "position": [
//!       { "name": "x",    "format": "float64" },
//!       { "name": "y",    "format": "float64" },
//!       { "name": "size", "format": "float64" }
//!     ],
//!     "leaderboard_entry": [
//!       { "name": "id",   "format": "uint32" },
//!       { "name": "name", "format": "null_str16" }
//!     ]
//!   }
//! }
//! ```
//!
//! Only self-delimiting formats are allowed; `end_str` and raw bytes need a
//! length the layout cannot express.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use opwire_buffer::{Format, WireBuffer};
use opwire_dispatch::table::read_bounded;
use opwire_dispatch::{
    DispatchConfig, DispatchError, Handler, OpcodeTable, ParseError, Routines,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur while loading a layout file.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The layout file could not be read.
    #[error("failed to load layout: {0}")]
    LoadFailed(String),

    /// The layout JSON is malformed.
    #[error("invalid layout json: {0}")]
    Json(#[from] serde_json::Error),

    /// A field uses a format that cannot be decoded without an external length.
    #[error("field {message}.{field} uses {format}, which is not self-delimiting")]
    UnsupportedFormat {
        message: String,
        field: String,
        format: Format,
    },

    /// The opcode table inside the layout is invalid.
    #[error(transparent)]
    Table(#[from] DispatchError),
}

/// One named field of a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(deserialize_with = "deserialize_format")]
    pub format: Format,
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    opcodes: HashMap<u8, String>,
    #[serde(default)]
    messages: BTreeMap<String, Vec<FieldSpec>>,
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// A message decoded by a [`LayoutHandler`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMessage {
    pub name: String,
    pub fields: Vec<(String, Value)>,
    pub trailing: usize,
}

/// Handler whose decode routines are generated from field layouts.
#[derive(Debug, Clone, Default)]
pub struct LayoutHandler {
    layouts: BTreeMap<String, Arc<[FieldSpec]>>,
    decoded: Vec<DecodedMessage>,
}

impl LayoutHandler {
    /// Build a handler from `(message name, fields)` entries.
    pub fn new(
        layouts: impl IntoIterator<Item = (String, Vec<FieldSpec>)>,
    ) -> Result<Self, LayoutError> {
        let mut handler = Self::default();
        for (message, fields) in layouts {
            if let Some(field) = fields.iter().find(|f| !f.format.is_self_delimiting()) {
                return Err(LayoutError::UnsupportedFormat {
                    message,
                    field: field.name.clone(),
                    format: field.format,
                });
            }
            handler.layouts.insert(message, fields.into());
        }
        Ok(handler)
    }

    /// Message names this handler can decode.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Messages decoded so far, oldest first.
    pub fn decoded(&self) -> &[DecodedMessage] {
        &self.decoded
    }

    /// Remove and return the most recently decoded message.
    pub fn take_last(&mut self) -> Option<DecodedMessage> {
        self.decoded.pop()
    }
}

impl Handler for LayoutHandler {
    fn routines(&self) -> Routines<Self> {
        let mut routines = Routines::new();
        for (message, fields) in &self.layouts {
            let message = message.clone();
            let fields = Arc::clone(fields);
            routines = routines.register(message.clone(), move |handler: &mut Self, buf| {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields.iter() {
                    values.push((field.name.clone(), pop_value(buf, field.format)?));
                }
                handler.decoded.push(DecodedMessage {
                    name: message.clone(),
                    fields: values,
                    trailing: buf.len(),
                });
                Ok(())
            });
        }
        routines
    }
}

/// Pop one value of `format` from `buf`.
pub fn pop_value(buf: &mut WireBuffer, format: Format) -> Result<Value, ParseError> {
    let value = match format {
        Format::Bool => Value::Bool(buf.pop_bool()?),
        Format::Int8 => Value::Int(i64::from(buf.pop_int8()?)),
        Format::UInt8 => Value::UInt(u64::from(buf.pop_uint8()?)),
        Format::Int16 => Value::Int(i64::from(buf.pop_int16()?)),
        Format::UInt16 => Value::UInt(u64::from(buf.pop_uint16()?)),
        Format::Int32 => Value::Int(i64::from(buf.pop_int32()?)),
        Format::UInt32 => Value::UInt(u64::from(buf.pop_uint32()?)),
        Format::Float32 => Value::Float(f64::from(buf.pop_float32()?)),
        Format::Float64 => Value::Float(buf.pop_float64()?),
        Format::NullStr8 => Value::Str(buf.pop_null_str8()?),
        Format::NullStr16 => Value::Str(buf.pop_null_str16()?),
        Format::LenStr8 => Value::Str(buf.pop_len_str8()?),
        Format::LenStr16 => Value::Str(buf.pop_len_str16()?),
        Format::EndStr8 | Format::EndStr16 | Format::Bytes => {
            return Err(ParseError::invalid(format!(
                "{format} cannot be decoded without a length"
            )))
        }
    };
    Ok(value)
}

/// Parse a layout file into its opcode table and handler.
pub fn from_json(json: &str) -> Result<(OpcodeTable, LayoutHandler), LayoutError> {
    let file: LayoutFile = serde_json::from_str(json)?;
    let table = OpcodeTable::from_map(file.opcodes)?;
    let handler = LayoutHandler::new(file.messages)?;
    Ok((table, handler))
}

/// Read and parse a layout file with the default size limit.
pub fn from_path(path: &Path) -> Result<(OpcodeTable, LayoutHandler), LayoutError> {
    from_path_with_config(path, &DispatchConfig::default())
}

/// Read and parse a layout file, bounded by `config.max_table_file_size`.
pub fn from_path_with_config(
    path: &Path,
    config: &DispatchConfig,
) -> Result<(OpcodeTable, LayoutHandler), LayoutError> {
    let content = read_bounded(path, config.max_table_file_size)
        .map_err(|err| LayoutError::LoadFailed(err.to_string()))?;
    from_json(&content)
}

fn deserialize_format<'de, D>(deserializer: D) -> Result<Format, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}
