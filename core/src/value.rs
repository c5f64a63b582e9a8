//! Runtime value model for schema validation.
//!
//! The engine validates dynamically-typed values, not JSON documents: the
//! object optionality rules need to tell a missing key apart from a key that
//! is present with an undefined value, and schemas can describe bigints,
//! dates, and true map/set containers. [`Value`] covers that domain and
//! converts to and from [`serde_json::Value`] at the boundary.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// A dynamically-typed runtime value.
///
/// Object keys keep insertion order, which is what makes issue ordering and
/// derived-schema output deterministic. Map entries are kept as ordered
/// pairs because container keys need not be strings.
///
/// # Examples
///
/// ```
/// use runtype_core::Value;
///
/// let v: Value = serde_json::json!({"name": "Al", "age": 42}).into();
/// assert_eq!(v.type_name(), "object");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A missing value (distinct from `Null`).
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// An arbitrary-size integer (modelled as `i64`).
    BigInt(i64),
    /// A string.
    String(String),
    /// A timestamp.
    Date(DateTime<Utc>),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// A string-keyed structure with stable key order.
    Object(IndexMap<String, Value>),
    /// A map container; keys may be any value.
    Map(Vec<(Value, Value)>),
    /// A set container.
    Set(Vec<Value>),
}

impl Value {
    /// Returns the closed type tag used by `invalid_type` issues.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
        }
    }

    /// Whether this value is `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Takes the value out, leaving `Undefined` behind.
    pub(crate) fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Undefined)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Conversion failure from [`Value`] to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value (or one nested inside it) has no JSON representation.
    #[error("value of type {0} has no JSON representation")]
    NotJson(&'static str),
}

impl TryFrom<Value> for serde_json::Value {
    type Error = ValueError;

    /// Converts to JSON. Dates become RFC 3339 strings; `Undefined`, maps,
    /// and sets are rejected.
    fn try_from(v: Value) -> Result<Self, ValueError> {
        match v {
            Value::Undefined => Err(ValueError::NotJson("undefined")),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Value::Number(n) => Ok(serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)),
            Value::BigInt(n) => Ok(serde_json::Value::Number(n.into())),
            Value::String(s) => Ok(serde_json::Value::String(s)),
            Value::Date(d) => Ok(serde_json::Value::String(d.to_rfc3339())),
            Value::Array(items) => Ok(serde_json::Value::Array(
                items
                    .into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, serde_json::Value::try_from(v)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            Value::Map(_) => Err(ValueError::NotJson("map")),
            Value::Set(_) => Err(ValueError::NotJson("set")),
        }
    }
}

/// Formats an `f64` for messages, dropping a trailing `.0` on whole numbers.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Renders a value compactly for messages and diagnostics.
pub(crate) fn fmt_value(v: &Value) -> String {
    match v {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => fmt_number(*n),
        Value::BigInt(n) => format!("{n}n"),
        Value::String(s) => format!("{s:?}"),
        Value::Date(d) => d.to_rfc3339(),
        Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_) => {
            v.type_name().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_preserves_key_order() {
        let v: Value = serde_json::json!({"b": 1, "a": [true, null]}).into();
        let Value::Object(map) = &v else {
            panic!("expected object")
        };
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);

        let json = serde_json::Value::try_from(v).unwrap();
        assert_eq!(json, serde_json::json!({"b": 1.0, "a": [true, null]}));
    }

    #[test]
    fn test_undefined_is_not_json() {
        let err = serde_json::Value::try_from(Value::Undefined).unwrap_err();
        assert_eq!(err, ValueError::NotJson("undefined"));
    }

    #[test]
    fn test_fmt_number_drops_trailing_zero() {
        assert_eq!(fmt_number(5.0), "5");
        assert_eq!(fmt_number(5.5), "5.5");
    }
}
