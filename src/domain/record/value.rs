//! Attribute values and record identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of a record attribute, or a value a filter requires
///
/// Comparison is exact: `Integer(1)` never equals `Text("1")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Returns true for values that count as "no value"
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Filter values that in-memory matchers skip instead of requiring
    pub fn is_ignored_filter(&self) -> bool {
        matches!(self, Self::Null | Self::Bool(false))
    }

    /// Text form used for regular expression matching
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Converts a JSON value; arrays and objects have no attribute form
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            other => write!(f, "{}", other.as_text()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Primary identifier of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Builds an identifier from an attribute value
    pub fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::Integer(n) => Some(Self::Int(*n)),
            AttributeValue::Text(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<RecordId> for AttributeValue {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(n) => Self::Integer(n),
            RecordId::Text(s) => Self::Text(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_exact_equality() {
        assert_ne!(RecordId::from(1), RecordId::from("1"));
        assert_eq!(RecordId::from(7), RecordId::Int(7));
    }

    #[test]
    fn test_record_id_serializes_untagged() {
        assert_eq!(serde_json::to_string(&RecordId::from(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&RecordId::from("a")).unwrap(), "\"a\"");

        let parsed: Vec<RecordId> = serde_json::from_str("[1, \"b\"]").unwrap();
        assert_eq!(parsed, vec![RecordId::Int(1), RecordId::Text("b".to_string())]);
    }

    #[test]
    fn test_attribute_from_json() {
        assert_eq!(
            AttributeValue::from_json(&json!(3)),
            Some(AttributeValue::Integer(3))
        );
        assert_eq!(
            AttributeValue::from_json(&json!("x")),
            Some(AttributeValue::from("x"))
        );
        assert_eq!(AttributeValue::from_json(&json!(null)), Some(AttributeValue::Null));
        assert_eq!(AttributeValue::from_json(&json!([1, 2])), None);
    }

    #[test]
    fn test_ignored_filter_values() {
        assert!(AttributeValue::Bool(false).is_ignored_filter());
        assert!(AttributeValue::Null.is_ignored_filter());
        assert!(!AttributeValue::Integer(0).is_ignored_filter());
        assert!(!AttributeValue::from("").is_ignored_filter());
    }
}
