//! Mapping between application types and [`Value`] trees.
//!
//! Types describe themselves through [`ToValue`] and [`FromValue`]. The codec
//! never inspects application types any other way.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::decoder::MsgPackDecoder;
use crate::encoder::MsgPackEncoder;
use crate::error::{MsgPackError, Result};
use crate::timestamp::Timestamp;
use crate::value::{Integer, Value};

/// Produces a [`Value`] tree for `self`.
pub trait ToValue {
    fn to_value(&self) -> Result<Value>;
}

/// Rebuilds `Self` from a decoded [`Value`] tree.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, found: &Value) -> MsgPackError {
    MsgPackError::UnsupportedValueKind {
        expected,
        found: found.kind(),
    }
}

/// Encodes any adaptable type with default options.
pub fn to_vec<T: ToValue + ?Sized>(value: &T) -> Result<Vec<u8>> {
    MsgPackEncoder::new().encode_to_vec(&value.to_value()?)
}

/// Decodes one value spanning all of `input` into `T`.
pub fn from_slice<T: FromValue>(input: &[u8]) -> Result<T> {
    T::from_value(MsgPackDecoder::new().decode_exact(input)?)
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

macro_rules! adapt_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::from(*self))
                }
            }

            impl FromValue for $t {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(i.as_i128()).map_err(|_| {
                            MsgPackError::NumericOverflow {
                                target: stringify!($t),
                            }
                        }),
                        other => Err(mismatch("integer", &other)),
                    }
                }
            }
        )*
    };
}

adapt_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl ToValue for i128 {
    fn to_value(&self) -> Result<Value> {
        if let Ok(n) = i64::try_from(*self) {
            return Ok(Value::Integer(Integer::from(n)));
        }
        u64::try_from(*self)
            .map(Value::from)
            .map_err(|_| MsgPackError::NumericOverflow { target: "64-bit integer" })
    }
}

impl ToValue for u128 {
    fn to_value(&self) -> Result<Value> {
        u64::try_from(*self)
            .map(Value::from)
            .map_err(|_| MsgPackError::NumericOverflow { target: "64-bit integer" })
    }
}

impl FromValue for i128 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i.as_i128()),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromValue for u128 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => u128::try_from(i.as_i128())
                .map_err(|_| MsgPackError::NumericOverflow { target: "u128" }),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Float(*self))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Float(*self as f64))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            // Integers widen when exact.
            Value::Integer(i) => {
                let f = i.as_i128() as f64;
                if f as i128 == i.as_i128() {
                    Ok(f)
                } else {
                    Err(MsgPackError::NumericOverflow { target: "f64" })
                }
            }
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Str(self.to_owned()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Str(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

impl FromValue for Timestamp {
    fn from_value(value: Value) -> Result<Self> {
        Timestamp::try_from(&value)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Result<Value> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value> {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

fn map_to_value<'a, K, V, I>(entries: I) -> Result<Value>
where
    K: ToValue + 'a,
    V: ToValue + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    entries
        .map(|(k, v)| -> Result<(Value, Value)> { Ok((k.to_value()?, v.to_value()?)) })
        .collect::<Result<Vec<_>>>()
        .map(Value::Map)
}

fn map_entries<K: FromValue, V: FromValue>(value: Value) -> Result<Vec<(K, V)>> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| -> Result<(K, V)> { Ok((K::from_value(k)?, V::from_value(v)?)) })
            .collect(),
        other => Err(mismatch("map", &other)),
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self> {
        let mut out = BTreeMap::new();
        for (k, v) in map_entries(value)? {
            if out.insert(k, v).is_some() {
                return Err(MsgPackError::DuplicateKey);
            }
        }
        Ok(out)
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: std::hash::BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self> {
        let mut out = HashMap::with_hasher(S::default());
        for (k, v) in map_entries(value)? {
            if out.insert(k, v).is_some() {
                return Err(MsgPackError::DuplicateKey);
            }
        }
        Ok(out)
    }
}
