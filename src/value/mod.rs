//! Value model for persistkv
//!
//! Every stored entry is a `Value`, a closed tree of six kinds:
//! - Null
//! - Boolean
//! - Number (IEEE-754 double)
//! - String
//! - Array (ordered, heterogeneous)
//! - Object (string-keyed map)
//!
//! # Type Rules
//!
//! - The kind tag is authoritative. There are no implicit coercions.
//! - `Number(0.0) != Boolean(false)`
//! - `String("null") != Null`
//! - Number equality follows IEEE-754: `NaN != NaN`, `-0.0 == 0.0`
//!
//! A `Value` exclusively owns its children. The structure is always a tree;
//! handing a value out of a store clones it.

mod convert;
mod errors;
mod typed;

pub use errors::{ValueError, ValueResult};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mapping from key to value.
///
/// Ordered so that serializing the same mapping always yields the same bytes,
/// and therefore the same checksum.
pub type KvsMap = BTreeMap<String, Value>;

/// A stored value.
///
/// Serialized untagged, so the document form of a value is its plain JSON
/// counterpart (`null`, `true`, `1.5`, `"text"`, `[...]`, `{...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit floating point number
    Number(f64),
    /// UTF-8 string
    String(String),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// String-keyed map of values
    Object(KvsMap),
}

/// Kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Returns the kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Boolean => "Boolean",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Array => "Array",
            ValueKind::Object => "Object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Creates an empty object.
    pub fn empty_object() -> Self {
        Value::Object(KvsMap::new())
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    fn mismatch(&self, expected: ValueKind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Returns `()` if this is `Null`.
    pub fn as_null(&self) -> ValueResult<()> {
        match self {
            Value::Null => Ok(()),
            other => Err(other.mismatch(ValueKind::Null)),
        }
    }

    /// Returns the boolean payload.
    pub fn as_bool(&self) -> ValueResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Boolean)),
        }
    }

    /// Returns the number payload.
    pub fn as_number(&self) -> ValueResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.mismatch(ValueKind::Number)),
        }
    }

    /// Returns the string payload.
    pub fn as_str(&self) -> ValueResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    /// Returns the array payload.
    pub fn as_array(&self) -> ValueResult<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::Array)),
        }
    }

    /// Returns the object payload.
    pub fn as_object(&self) -> ValueResult<&KvsMap> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(other.mismatch(ValueKind::Object)),
        }
    }

    /// Consumes the value and returns the object payload.
    pub fn into_object(self) -> ValueResult<KvsMap> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(other.mismatch(ValueKind::Object)),
        }
    }

    /// Returns true if every number in this tree is finite.
    ///
    /// The document format has no spelling for NaN or infinity.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Number(n) => n.is_finite(),
            Value::Array(items) => items.iter().all(Value::is_finite),
            Value::Object(map) => object_is_finite(map),
            Value::Null | Value::Boolean(_) | Value::String(_) => true,
        }
    }

    /// Maximum number of nested arrays and objects along any path.
    ///
    /// Scalars are depth 0, `[]` and `{}` are depth 1.
    pub fn nesting_depth(&self) -> usize {
        match self {
            Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => 0,
            Value::Array(items) => 1 + items.iter().map(Value::nesting_depth).max().unwrap_or(0),
            Value::Object(map) => object_nesting_depth(map),
        }
    }
}

/// Nesting depth of `map` taken as an object, so never less than 1.
pub fn object_nesting_depth(map: &KvsMap) -> usize {
    1 + map.values().map(Value::nesting_depth).max().unwrap_or(0)
}

/// Returns true if every number under `map` is finite.
pub fn object_is_finite(map: &KvsMap) -> bool {
    map.values().all(Value::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_each_variant() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::Boolean(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::Number(1.0).kind(), ValueKind::Number);
        assert_eq!(Value::String("x".into()).kind(), ValueKind::String);
        assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array);
        assert_eq!(Value::empty_object().kind(), ValueKind::Object);
    }

    #[test]
    fn test_no_cross_kind_equality() {
        assert_ne!(Value::Number(0.0), Value::Boolean(false));
        assert_ne!(Value::Number(1.0), Value::Boolean(true));
        assert_ne!(Value::String("null".into()), Value::Null);
        assert_ne!(Value::String(String::new()), Value::Null);
        assert_ne!(Value::Array(vec![]), Value::empty_object());
    }

    #[test]
    fn test_ieee_number_equality() {
        assert_eq!(Value::Number(-0.0), Value::Number(0.0));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let err = Value::Boolean(false).as_number().unwrap_err();
        assert_eq!(
            err,
            ValueError::TypeMismatch {
                expected: ValueKind::Number,
                found: ValueKind::Boolean,
            }
        );
        assert!(Value::String("null".into()).as_null().is_err());
        assert!(Value::Null.as_str().is_err());
    }

    #[test]
    fn test_accessor_matching_kind() {
        assert_eq!(Value::Number(2.5).as_number().unwrap(), 2.5);
        assert!(Value::Boolean(true).as_bool().unwrap());
        assert_eq!(Value::String("a".into()).as_str().unwrap(), "a");
        assert!(Value::Null.as_null().is_ok());
        assert_eq!(Value::Array(vec![Value::Null]).as_array().unwrap().len(), 1);
        assert!(Value::empty_object().as_object().unwrap().is_empty());
    }

    #[test]
    fn test_nested_tree_equality() {
        let mut inner = KvsMap::new();
        inner.insert("n".into(), Value::Number(1.0));
        let a = Value::Array(vec![Value::Object(inner.clone()), Value::Null]);
        let b = Value::Array(vec![Value::Object(inner), Value::Null]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_finite_walks_tree() {
        let mut map = KvsMap::new();
        map.insert("ok".into(), Value::Number(1.0));
        assert!(Value::Object(map.clone()).is_finite());

        map.insert("bad".into(), Value::Array(vec![Value::Number(f64::INFINITY)]));
        assert!(!Value::Object(map).is_finite());
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(Value::Null.nesting_depth(), 0);
        assert_eq!(Value::String("[[[".into()).nesting_depth(), 0);
        assert_eq!(Value::Array(vec![]).nesting_depth(), 1);
        assert_eq!(Value::empty_object().nesting_depth(), 1);

        let mut map = KvsMap::new();
        map.insert("flat".into(), Value::Number(1.0));
        map.insert(
            "deep".into(),
            Value::Array(vec![Value::Array(vec![Value::empty_object()])]),
        );
        assert_eq!(object_nesting_depth(&map), 4);
        assert_eq!(Value::Object(map).nesting_depth(), 4);
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&Value::Array(vec![
            Value::Null,
            Value::Boolean(true),
            Value::Number(1.5),
            Value::String("s".into()),
        ]))
        .unwrap();
        assert_eq!(json, r#"[null,true,1.5,"s"]"#);
    }

    #[test]
    fn test_untagged_deserialization_keeps_kinds() {
        let value: Value = serde_json::from_str(r#"{"a":0,"b":false,"c":"null","d":null}"#).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map["a"], Value::Number(0.0));
        assert_eq!(map["b"], Value::Boolean(false));
        assert_eq!(map["c"], Value::String("null".into()));
        assert_eq!(map["d"], Value::Null);
    }
}
