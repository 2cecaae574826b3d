//! Storing serde types as values
//!
//! Any `Serialize` type can be stored by converting it through its
//! `serde_json` form, and any `DeserializeOwned` type read back the same
//! way. This replaces hand-written per-type conversions: deriving
//! `Serialize` and `Deserialize` on a struct is enough to store it.
//!
//! Every number becomes an f64 on the way in, so integers beyond 2^53 lose
//! precision. `serde_json` turns non-finite floats into `null`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

use super::{KvsMap, Value, ValueError, ValueResult};

/// 2^53. Every integer of smaller magnitude is exact as an f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Value {
    /// Converts any serializable type into a value tree.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> ValueResult<Value> {
        let json = serde_json::to_value(value).map_err(|e| ValueError::Serialize(e.to_string()))?;
        from_json(json)
    }

    /// Reads this value tree back as `T`.
    ///
    /// Integral numbers are offered to `T` as integers, so integer fields
    /// deserialize from them.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> ValueResult<T> {
        let json = to_json(self)?;
        serde_json::from_value(json).map_err(|e| ValueError::Deserialize(e.to_string()))
    }
}

fn from_json(json: JsonValue) -> ValueResult<Value> {
    Ok(match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(b),
        JsonValue::Number(n) => Value::Number(
            n.as_f64()
                .ok_or_else(|| ValueError::Serialize(format!("number {} is not an f64", n)))?,
        ),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => {
            Value::Array(items.into_iter().map(from_json).collect::<ValueResult<_>>()?)
        }
        JsonValue::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| Ok((key, from_json(item)?)))
                .collect::<ValueResult<KvsMap>>()?,
        ),
    })
}

fn to_json(value: &Value) -> ValueResult<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(number_to_json(*n)?),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => {
            JsonValue::Array(items.iter().map(to_json).collect::<ValueResult<_>>()?)
        }
        Value::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, item)| Ok((key.clone(), to_json(item)?)))
                .collect::<ValueResult<Map<String, JsonValue>>>()?,
        ),
    })
}

fn number_to_json(n: f64) -> ValueResult<Number> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(if n < 0.0 {
            Number::from(n as i64)
        } else {
            Number::from(n as u64)
        });
    }
    Number::from_f64(n)
        .ok_or_else(|| ValueError::Deserialize(format!("non-finite number {} cannot be read", n)))
}
