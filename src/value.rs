//! Value types, raw values and coercion
//!
//! Raw values arrive untyped from the hosting framework (strings, numbers,
//! booleans, lists). Each key declares a [`ValueType`], and [`ValueType::coerce`]
//! turns a [`RawValue`] into the matching [`TypedValue`] or explains why it can't.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Declared type of a configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    String,
    /// 64-bit signed integer
    Long,
    /// 32-bit signed integer
    Int,
    Double,
    Boolean,
    /// Ordered list of strings
    List,
    /// String that is never rendered in logs or introspection output
    Password,
}

impl ValueType {
    /// Get the upper-case name used in messages and descriptors
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "STRING",
            ValueType::Long => "LONG",
            ValueType::Int => "INT",
            ValueType::Double => "DOUBLE",
            ValueType::Boolean => "BOOLEAN",
            ValueType::List => "LIST",
            ValueType::Password => "PASSWORD",
        }
    }

    /// Convert a raw value into this type.
    ///
    /// Strings are trimmed before conversion. Numbers and booleans are accepted
    /// for string-like types and rendered as text, since file and environment
    /// sources may have already parsed them. The error is a human-readable
    /// reason quoting the offending value.
    pub fn coerce(&self, raw: &RawValue) -> Result<TypedValue, String> {
        if let RawValue::Null = raw {
            return Err(format!("Null value is not a valid {}", self.name()));
        }

        match self {
            ValueType::String => scalar_text(raw)
                .map(TypedValue::String)
                .ok_or_else(|| self.mismatch(raw, "expected a string")),
            ValueType::Password => scalar_text(raw)
                .map(|s| TypedValue::Password(Password::new(s)))
                .ok_or_else(|| self.mismatch(raw, "expected a string")),
            ValueType::Boolean => match raw {
                RawValue::Bool(b) => Ok(TypedValue::Boolean(*b)),
                RawValue::String(s) if s.trim().eq_ignore_ascii_case("true") => {
                    Ok(TypedValue::Boolean(true))
                }
                RawValue::String(s) if s.trim().eq_ignore_ascii_case("false") => {
                    Ok(TypedValue::Boolean(false))
                }
                _ => Err(self.mismatch(raw, "expected true or false")),
            },
            ValueType::Int => {
                let wide = match raw {
                    RawValue::Integer(i) => Some(*i),
                    RawValue::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                wide.and_then(|i| i32::try_from(i).ok())
                    .map(TypedValue::Int)
                    .ok_or_else(|| self.mismatch(raw, "not a 32-bit integer"))
            }
            ValueType::Long => match raw {
                RawValue::Integer(i) => Ok(TypedValue::Long(*i)),
                RawValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(TypedValue::Long)
                    .map_err(|_| self.mismatch(raw, "not a 64-bit integer")),
                _ => Err(self.mismatch(raw, "not a 64-bit integer")),
            },
            ValueType::Double => match raw {
                RawValue::Float(f) => Ok(TypedValue::Double(*f)),
                RawValue::Integer(i) => Ok(TypedValue::Double(*i as f64)),
                RawValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(TypedValue::Double)
                    .map_err(|_| self.mismatch(raw, "not a number")),
                _ => Err(self.mismatch(raw, "not a number")),
            },
            ValueType::List => match raw {
                RawValue::List(items) => items
                    .iter()
                    .map(scalar_text)
                    .collect::<Option<Vec<_>>>()
                    .map(TypedValue::List)
                    .ok_or_else(|| self.mismatch(raw, "list elements must be scalar values")),
                RawValue::String(s) if s.trim().is_empty() => Ok(TypedValue::List(Vec::new())),
                RawValue::String(s) => Ok(TypedValue::List(
                    s.split(',').map(|item| item.trim().to_string()).collect(),
                )),
                _ => Err(self.mismatch(raw, "expected a list or a comma-separated string")),
            },
        }
    }

    fn mismatch(&self, raw: &RawValue, detail: &str) -> String {
        match self {
            ValueType::Password => format!("Invalid value for type {}: {}", self.name(), detail),
            _ => format!("Invalid value '{}' for type {}: {}", raw, self.name(), detail),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn scalar_text(raw: &RawValue) -> Option<String> {
    match raw {
        RawValue::String(s) => Some(s.trim().to_string()),
        RawValue::Integer(i) => Some(i.to_string()),
        RawValue::Float(f) => Some(f.to_string()),
        RawValue::Bool(b) => Some(b.to_string()),
        RawValue::List(_) | RawValue::Null => None,
    }
}

/// An untyped value as supplied by the hosting framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Convert a JSON value; objects are not representable and yield `None`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(RawValue::Null),
            Value::Bool(b) => Some(RawValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(RawValue::Integer(i)),
                None => n.as_f64().map(RawValue::Float),
            },
            Value::String(s) => Some(RawValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(RawValue::from_json)
                .collect::<Option<Vec<_>>>()
                .map(RawValue::List),
            Value::Object(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("null"),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Integer(i) => write!(f, "{}", i),
            RawValue::Float(x) => write!(f, "{}", x),
            RawValue::String(s) => f.write_str(s),
            RawValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Integer(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        RawValue::Integer(i64::from(i))
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(items: Vec<&str>) -> Self {
        RawValue::List(items.into_iter().map(RawValue::from).collect())
    }
}

/// Secret string value; never shown by `Debug`, `Display` or serialization
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const HIDDEN: &'static str = "[hidden]";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the actual secret
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::HIDDEN)
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::HIDDEN)
    }
}

impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::HIDDEN)
    }
}

/// A value converted to its declared type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Long(i64),
    Int(i32),
    Double(f64),
    Boolean(bool),
    List(Vec<String>),
    Password(Password),
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::String(_) => ValueType::String,
            TypedValue::Long(_) => ValueType::Long,
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Double(_) => ValueType::Double,
            TypedValue::Boolean(_) => ValueType::Boolean,
            TypedValue::List(_) => ValueType::List,
            TypedValue::Password(_) => ValueType::Password,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Long(i) => Some(*i),
            TypedValue::Int(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Double(f) => Some(*f),
            TypedValue::Long(i) => Some(*i as f64),
            TypedValue::Int(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Long(i) => write!(f, "{}", i),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Double(x) => write!(f, "{}", x),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::List(items) => f.write_str(&items.join(",")),
            TypedValue::Password(p) => write!(f, "{}", p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_from_numeric_string() {
        let value = ValueType::Long.coerce(&RawValue::from(" 2500 ")).unwrap();
        assert_eq!(value, TypedValue::Long(2500));
    }

    #[test]
    fn test_long_rejects_non_numeric_string() {
        let err = ValueType::Long.coerce(&RawValue::from("soon")).unwrap_err();
        assert!(err.contains("'soon'"));
        assert!(err.contains("LONG"));
    }

    #[test]
    fn test_int_rejects_out_of_range() {
        let err = ValueType::Int.coerce(&RawValue::Integer(i64::from(i32::MAX) + 1)).unwrap_err();
        assert!(err.contains("32-bit"));
    }

    #[test]
    fn test_boolean_strings_are_case_insensitive() {
        assert_eq!(ValueType::Boolean.coerce(&"TRUE".into()).unwrap(), TypedValue::Boolean(true));
        assert_eq!(ValueType::Boolean.coerce(&"false".into()).unwrap(), TypedValue::Boolean(false));
        assert!(ValueType::Boolean.coerce(&"yes".into()).is_err());
    }

    #[test]
    fn test_list_from_comma_separated_string() {
        let value = ValueType::List.coerce(&"a:1 , b:2,c:3".into()).unwrap();
        assert_eq!(value.as_list().unwrap(), ["a:1", "b:2", "c:3"]);

        let empty = ValueType::List.coerce(&"  ".into()).unwrap();
        assert!(empty.as_list().unwrap().is_empty());
    }

    #[test]
    fn test_string_is_trimmed_and_numbers_render() {
        assert_eq!(ValueType::String.coerce(&"  UTF-8 ".into()).unwrap(), TypedValue::String("UTF-8".into()));
        assert_eq!(ValueType::String.coerce(&RawValue::Integer(7)).unwrap(), TypedValue::String("7".into()));
        assert!(ValueType::String.coerce(&vec!["a"].into()).is_err());
    }

    #[test]
    fn test_password_is_never_rendered() {
        let value = ValueType::Password.coerce(&"s3cret".into()).unwrap();
        assert_eq!(value.to_string(), "[hidden]");
        assert_eq!(format!("{:?}", value), "Password([hidden])");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"[hidden]\"");
    }

    #[test]
    fn test_password_mismatch_does_not_quote_the_secret() {
        let err = ValueType::Password.coerce(&vec!["hunter2"].into()).unwrap_err();
        assert!(!err.contains("hunter2"), "{}", err);
        assert!(err.contains("PASSWORD"));
    }

    #[test]
    fn test_null_is_rejected() {
        assert!(ValueType::String.coerce(&RawValue::Null).is_err());
    }

    #[test]
    fn test_raw_value_from_json() {
        let raw = RawValue::from_json(&serde_json::json!(["a", 1, true])).unwrap();
        assert_eq!(
            raw,
            RawValue::List(vec![RawValue::from("a"), RawValue::Integer(1), RawValue::Bool(true)])
        );
        assert!(RawValue::from_json(&serde_json::json!({"nested": 1})).is_none());
    }
}
