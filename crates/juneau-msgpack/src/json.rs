//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON has no binary, extension or non-string-key forms, so the conversion
//! to JSON is lossy:
//! - binary becomes a `data:` URI string,
//! - an extension becomes `{"type": <code>, "data": "<base64>"}`,
//! - non-finite floats become `null`,
//! - integer, boolean and null keys become their JSON text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number};

use crate::error::{MsgPackError, Result};
use crate::value::{Integer, Value};

/// Prefix used when rendering binary values as JSON strings.
pub const BIN_URI_START: &str = "data:application/octet-stream;base64,";

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(Integer::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Integer(Integer::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn integer_to_json(i: Integer) -> serde_json::Value {
    match (i.as_i64(), i.as_u64()) {
        (_, Some(u)) => serde_json::Value::Number(Number::from(u)),
        (Some(n), None) => serde_json::Value::Number(Number::from(n)),
        // Unreachable: every Integer fits one of the two.
        (None, None) => serde_json::Value::Null,
    }
}

fn key_to_json(key: Value) -> Result<String> {
    match key {
        Value::Str(s) => Ok(s),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_owned()),
        other => Err(MsgPackError::UnsupportedValueKind {
            expected: "string, integer, boolean or null map key",
            found: other.kind(),
        }),
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = MsgPackError;

    fn try_from(v: Value) -> Result<Self> {
        Ok(match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => integer_to_json(i),
            Value::Float(f) => Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Binary(b) => {
                serde_json::Value::String(format!("{BIN_URI_START}{}", STANDARD.encode(b)))
            }
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_>>()?,
            ),
            Value::Map(entries) => {
                let mut obj = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    obj.insert(key_to_json(k)?, serde_json::Value::try_from(v)?);
                }
                serde_json::Value::Object(obj)
            }
            Value::Extension(ext) => {
                let mut obj = Map::with_capacity(2);
                obj.insert("type".to_owned(), serde_json::Value::from(ext.type_code));
                obj.insert(
                    "data".to_owned(),
                    serde_json::Value::String(STANDARD.encode(&ext.data)),
                );
                serde_json::Value::Object(obj)
            }
        })
    }
}
