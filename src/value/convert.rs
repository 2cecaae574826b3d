//! Conversions between Rust types and `Value`
//!
//! `From` goes into a value unconditionally. `TryFrom<&Value>` comes back out
//! only through the matching kind and clones the payload.

use super::{KvsMap, Value, ValueError, ValueKind};

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Number(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<Vec<Value>> for Value {
    fn from(val: Vec<Value>) -> Self {
        Value::Array(val)
    }
}

impl From<KvsMap> for Value {
    fn from(val: KvsMap) -> Self {
        Value::Object(val)
    }
}

macro_rules! impl_try_from_value {
    ($to:ty, $variant:ident, $kind:ident) => {
        impl TryFrom<&Value> for $to {
            type Error = ValueError;

            fn try_from(value: &Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(inner) => Ok(inner.clone()),
                    other => Err(ValueError::TypeMismatch {
                        expected: ValueKind::$kind,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

impl_try_from_value!(f64, Number, Number);
impl_try_from_value!(bool, Boolean, Boolean);
impl_try_from_value!(String, String, String);
impl_try_from_value!(Vec<Value>, Array, Array);
impl_try_from_value!(KvsMap, Object, Object);

impl TryFrom<&Value> for () {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        value.as_null()
    }
}

impl TryFrom<&Value> for Value {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(value.clone())
    }
}
