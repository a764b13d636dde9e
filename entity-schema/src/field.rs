use serde::{Deserialize, Serialize};
use std::fmt;

/// How values for a field are written into a backend filter query
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// The value's own type decides: strings quoted, numbers bare
    #[default]
    String,
    Integer,
    /// Numbers with a `d` suffix, e.g. `3.5d`
    Double,
    Boolean,
    /// `'YYYY-MM-DD'`
    Date,
    /// `'YYYY-MM-DDTHH:MM:SSZ'`
    Timestamp,
    /// `datetimeoffset'YYYY-MM-DDTHH:MM:SSZ'`
    #[serde(rename = "datetimeoffset")]
    DateTimeOffset,
    /// Booleans stored as the strings `'1'` and `'0'`
    BooleanIntString,
    /// Readable but rejected by the backend's `$filter`
    NonFilterable,
}

impl FieldType {
    pub fn is_filterable(&self) -> bool {
        !matches!(self, FieldType::NonFilterable)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Double => write!(f, "double"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Date => write!(f, "date"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::DateTimeOffset => write!(f, "datetimeoffset"),
            FieldType::BooleanIntString => write!(f, "boolean_int_string"),
            FieldType::NonFilterable => write!(f, "non_filterable"),
        }
    }
}

/// One property of an entity: our name, the backend's name and its type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
    #[serde(rename = "type", default)]
    field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exposed: Option<bool>,
}

impl FieldSpec {
    pub fn new(name: &str, backend_name: &str) -> Self {
        Self {
            name: name.to_string(),
            backend: Some(backend_name.to_string()),
            field_type: FieldType::default(),
            exposed: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_exposed(mut self, exposed: bool) -> Self {
        self.exposed = Some(exposed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name used in backend queries; falls back to our name when unmapped
    pub fn backend_name(&self) -> &str {
        self.backend.as_deref().unwrap_or(&self.name)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Exposed fields are listed as available properties. Names with a
    /// leading underscore are hidden unless configured otherwise.
    pub fn is_exposed(&self) -> bool {
        self.exposed.unwrap_or(!self.name.starts_with('_'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_defaults_to_name() {
        let field: FieldSpec = serde_yaml_ng::from_str("name: serial_number").unwrap();
        assert_eq!(field.backend_name(), "serial_number");
        assert_eq!(field.field_type(), FieldType::String);
    }

    #[test]
    fn test_underscore_fields_are_hidden() {
        assert!(!FieldSpec::new("_status", "status").is_exposed());
        assert!(FieldSpec::new("status_text", "statusDescription").is_exposed());
        assert!(FieldSpec::new("_status", "status")
            .with_exposed(true)
            .is_exposed());
    }

    #[test]
    fn test_field_type_names() {
        let field: FieldSpec =
            serde_yaml_ng::from_str("{name: changed_on, backend: ChangedOn, type: datetimeoffset}")
                .unwrap();
        assert_eq!(field.field_type(), FieldType::DateTimeOffset);
        assert_eq!(field.field_type().to_string(), "datetimeoffset");

        let field: FieldSpec =
            serde_yaml_ng::from_str("{name: active, type: boolean_int_string}").unwrap();
        assert_eq!(field.field_type(), FieldType::BooleanIntString);
        assert!(!FieldType::NonFilterable.is_filterable());
    }
}
