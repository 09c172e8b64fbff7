//! The closed [`Value`] tree the codec encodes and decodes.

use std::fmt;

/// A normalized 64-bit integer.
///
/// Non-negative numbers are always held as unsigned and negative numbers as
/// signed, so two `Integer`s are equal exactly when they denote the same
/// number, whichever Rust type they were built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Integer(IntRepr);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum IntRepr {
    // Declared first so negatives order before non-negatives.
    Neg(i64),
    Pos(u64),
}

impl Integer {
    pub fn is_negative(&self) -> bool {
        matches!(self.0, IntRepr::Neg(_))
    }

    /// Returns the value as `i64` if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            IntRepr::Neg(n) => Some(n),
            IntRepr::Pos(n) => i64::try_from(n).ok(),
        }
    }

    /// Returns the value as `u64` if it is non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            IntRepr::Neg(_) => None,
            IntRepr::Pos(n) => Some(n),
        }
    }

    pub fn as_i128(&self) -> i128 {
        match self.0 {
            IntRepr::Neg(n) => n as i128,
            IntRepr::Pos(n) => n as i128,
        }
    }
}

impl From<u64> for Integer {
    fn from(n: u64) -> Self {
        Integer(IntRepr::Pos(n))
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        if n < 0 {
            Integer(IntRepr::Neg(n))
        } else {
            Integer(IntRepr::Pos(n as u64))
        }
    }
}

macro_rules! integer_from {
    ($via:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(n: $t) -> Self {
                    Integer::from(n as $via)
                }
            }

            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(Integer::from(n as $via))
                }
            }
        )*
    };
}

integer_from!(u64: u8, u16, u32, usize);
integer_from!(i64: i8, i16, i32, isize);

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            IntRepr::Neg(n) => write!(f, "{n}"),
            IntRepr::Pos(n) => write!(f, "{n}"),
        }
    }
}

/// An application-defined leaf: a signed type code plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    pub type_code: i8,
    pub data: Vec<u8>,
}

impl Extension {
    pub fn new(type_code: i8, data: Vec<u8>) -> Self {
        Self { type_code, data }
    }
}

/// The closed set of value kinds understood by the codec.
///
/// Containers own their children, so a tree is always acyclic. Map entries
/// keep insertion order and may use any `Value` as a key; duplicate keys are
/// representable on the wire and are only rejected by adapters.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(Integer),
    Float(f64),
    Str(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Extension(Extension),
}

impl Value {
    /// Builds a map from key/value pairs, keeping their order.
    pub fn map<K, V, I>(entries: I) -> Value
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Extension(_) => "extension",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Looks up the first map entry whose key is the string `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Structural equality. Floats compare by bit pattern so that every decoded
/// float equals the float it was encoded from, NaN included.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Extension(a), Value::Extension(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n.into())
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Extension> for Value {
    fn from(ext: Extension) -> Self {
        Value::Extension(ext)
    }
}
