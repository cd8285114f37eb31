//! Attribute filters for record lookups

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::AttributeValue;

/// What a filter requires of one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    /// Attribute must equal this value
    Exact(AttributeValue),
    /// Attribute must equal one of these values
    AnyOf(Vec<AttributeValue>),
}

impl Requirement {
    /// Acceptable values; a bare value is a one-element set
    pub fn acceptable(&self) -> &[AttributeValue] {
        match self {
            Self::Exact(value) => std::slice::from_ref(value),
            Self::AnyOf(values) => values,
        }
    }

    /// Whether in-memory matchers should skip this entry
    pub fn is_ignored(&self) -> bool {
        match self {
            Self::Exact(value) => value.is_ignored_filter(),
            Self::AnyOf(_) => false,
        }
    }

    /// Typed JSON form; `3`, `3.0`, `"3"` and `null` stay distinct
    fn canonical(&self) -> serde_json::Value {
        match self {
            Self::Exact(value) => canonical_value(value),
            Self::AnyOf(values) => {
                let mut members: Vec<serde_json::Value> =
                    values.iter().map(canonical_value).collect();
                members.sort_by_cached_key(|member| member.to_string());
                members.dedup();
                serde_json::Value::Array(members)
            }
        }
    }
}

fn canonical_value(value: &AttributeValue) -> serde_json::Value {
    match value {
        AttributeValue::Null => serde_json::Value::Null,
        AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
        AttributeValue::Integer(n) => serde_json::Value::from(*n),
        AttributeValue::Float(n) => match serde_json::Number::from_f64(*n) {
            Some(number) => serde_json::Value::Number(number),
            None => serde_json::json!({ "float": n.to_string() }),
        },
        AttributeValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}

impl From<AttributeValue> for Requirement {
    fn from(value: AttributeValue) -> Self {
        Self::Exact(value)
    }
}

impl From<&str> for Requirement {
    fn from(value: &str) -> Self {
        Self::Exact(value.into())
    }
}

impl From<String> for Requirement {
    fn from(value: String) -> Self {
        Self::Exact(value.into())
    }
}

impl From<i64> for Requirement {
    fn from(value: i64) -> Self {
        Self::Exact(value.into())
    }
}

impl From<i32> for Requirement {
    fn from(value: i32) -> Self {
        Self::Exact(value.into())
    }
}

impl From<bool> for Requirement {
    fn from(value: bool) -> Self {
        Self::Exact(value.into())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for Requirement {
    fn from(values: Vec<T>) -> Self {
        Self::AnyOf(values.into_iter().map(Into::into).collect())
    }
}

/// Mapping from attribute name to requirement, evaluated as a logical AND
///
/// Entries are kept sorted by attribute name, so two filters built in a
/// different order are equal and render the same signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    entries: BTreeMap<String, Requirement>,
}

impl FilterSpec {
    /// Creates an empty filter, which matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `attribute` to equal `value`
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.entries
            .insert(attribute.into(), Requirement::Exact(value.into()));
        self
    }

    /// Requires `attribute` to be one of `values`
    pub fn with_any<V: Into<AttributeValue>>(
        mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.entries
            .insert(attribute.into(), Requirement::AnyOf(values));
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, requirement: Requirement) {
        self.entries.insert(attribute.into(), requirement);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, attribute: &str) -> Option<&Requirement> {
        self.entries.get(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical text used to derive cache key signatures
    pub fn canonical(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.canonical()))
            .collect();

        serde_json::Value::Object(map).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSpec
where
    K: Into<String>,
    V: Into<Requirement>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_value_is_single_element_set() {
        let requirement = Requirement::from("active");
        assert_eq!(requirement.acceptable(), &[AttributeValue::from("active")]);
    }

    #[test]
    fn test_canonical_ignores_insertion_order() {
        let a = FilterSpec::new().with("status", "active").with("brand", 3);
        let b = FilterSpec::new().with("brand", 3).with("status", "active");

        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_canonical_sorts_set_members() {
        let a = FilterSpec::new().with_any("color", ["red", "blue"]);
        let b = FilterSpec::new().with_any("color", ["blue", "red"]);

        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), r#"{"color":["blue","red"]}"#);
    }

    #[test]
    fn test_empty_filter_canonical() {
        assert!(FilterSpec::new().is_empty());
        assert_eq!(FilterSpec::new().canonical(), "{}");
    }

    #[test]
    fn test_ignored_requirements() {
        assert!(Requirement::from(false).is_ignored());
        assert!(Requirement::Exact(AttributeValue::Null).is_ignored());
        assert!(!Requirement::from(0).is_ignored());
        assert!(!Requirement::AnyOf(vec![]).is_ignored());
    }

    #[test]
    fn test_deserialize_from_json_map() {
        let filter: FilterSpec =
            serde_json::from_str(r#"{"status": "active", "brand": [1, 2]}"#).unwrap();

        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter.get("brand"),
            Some(&Requirement::AnyOf(vec![
                AttributeValue::Integer(1),
                AttributeValue::Integer(2)
            ]))
        );
    }

    #[test]
    fn test_canonical_keeps_value_types() {
        let canonical = |value: AttributeValue| FilterSpec::new().with("brand", value).canonical();

        assert_eq!(canonical(3.into()), r#"{"brand":3}"#);
        assert_eq!(canonical("3".into()), r#"{"brand":"3"}"#);
        assert_eq!(canonical(3.0.into()), r#"{"brand":3.0}"#);
        assert_eq!(canonical(AttributeValue::Null), r#"{"brand":null}"#);
        assert_eq!(canonical("null".into()), r#"{"brand":"null"}"#);
    }

    #[test]
    fn test_canonical_set_members_keep_types() {
        let mixed = FilterSpec::new().with_any("brand", [AttributeValue::from(1), "1".into()]);
        let ints = FilterSpec::new().with_any("brand", [1, 1]);

        assert_eq!(mixed.canonical(), r#"{"brand":["1",1]}"#);
        assert_eq!(ints.canonical(), r#"{"brand":[1]}"#);
    }
}
