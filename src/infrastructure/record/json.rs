//! Record service for JSON object records

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::Value;

use crate::domain::record::{AttributeValue, RecordId, RecordService};
use crate::domain::DomainError;

/// Reads attributes of `serde_json::Value` objects by field name
///
/// When a set of attributes is declared, asking for any other attribute is
/// an error instead of a silent miss.
#[derive(Debug, Clone)]
pub struct JsonRecordService {
    id_field: String,
    alias_field: String,
    sort_field: Option<String>,
    attributes: Option<HashSet<String>>,
}

impl JsonRecordService {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            alias_field: "alias".to_string(),
            sort_field: None,
            attributes: None,
        }
    }

    pub fn with_alias_field(mut self, field: impl Into<String>) -> Self {
        self.alias_field = field.into();
        self
    }

    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    /// Declares the only attributes records may be asked for
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    fn field(record: &Value, name: &str) -> Option<AttributeValue> {
        record.get(name).and_then(AttributeValue::from_json)
    }

    fn compare(a: Option<AttributeValue>, b: Option<AttributeValue>) -> Ordering {
        match (a, b) {
            (Some(AttributeValue::Integer(x)), Some(AttributeValue::Integer(y))) => x.cmp(&y),
            (Some(AttributeValue::Float(x)), Some(AttributeValue::Float(y))) => {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Some(AttributeValue::Integer(x)), Some(AttributeValue::Float(y))) => {
                (x as f64).partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Some(AttributeValue::Float(x)), Some(AttributeValue::Integer(y))) => {
                x.partial_cmp(&(y as f64)).unwrap_or(Ordering::Equal)
            }
            (Some(x), Some(y)) => x.as_text().cmp(&y.as_text()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl RecordService<Value> for JsonRecordService {
    fn attribute(&self, record: &Value, name: &str) -> Result<Option<AttributeValue>, DomainError> {
        if let Some(attributes) = &self.attributes {
            if !attributes.contains(name) {
                return Err(DomainError::attribute(format!("Unknown attribute '{}'", name)));
            }
        }

        Ok(Self::field(record, name))
    }

    fn primary_key(&self, record: &Value) -> Result<RecordId, DomainError> {
        Self::field(record, &self.id_field)
            .as_ref()
            .and_then(RecordId::from_attribute)
            .ok_or_else(|| {
                DomainError::attribute(format!(
                    "Record has no usable primary key in field '{}'",
                    self.id_field
                ))
            })
    }

    fn alias_attribute(&self) -> &str {
        &self.alias_field
    }

    fn sort(&self, records: &mut Vec<Value>) {
        if let Some(field) = &self.sort_field {
            records.sort_by(|a, b| Self::compare(Self::field(a, field), Self::field(b, field)));
        }
    }
}
