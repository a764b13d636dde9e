use crate::errors::SchemaError;
use crate::field::FieldSpec;
use crate::schema::{PropertySchema, SchemaProvider};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

/// Schema definitions as they appear in YAML/JSON files: entity -> fields
type RawSchemas = IndexMap<String, Vec<FieldSpec>>;

/// Registry of property schemas for a set of entity types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, PropertySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the schema for its entity type
    pub fn insert(&mut self, schema: PropertySchema) -> Option<PropertySchema> {
        self.schemas.insert(schema.entity().to_string(), schema)
    }

    pub fn with_schema(mut self, schema: PropertySchema) -> Self {
        self.insert(schema);
        self
    }

    pub fn get(&self, entity_type: &str) -> Option<&PropertySchema> {
        self.schemas.get(entity_type)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let raw: RawSchemas = serde_yaml_ng::from_str(yaml)?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchemas = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Load a registry from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        let registry = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SchemaError::UnsupportedFormat(path.display().to_string())),
        }
        .with_context(|| format!("Failed to parse schema file: {}", path.display()))?;
        debug!(
            "Loaded {} entity schema(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Serialize back into the YAML layout accepted by `from_yaml_str`
    pub fn to_yaml_string(&self) -> Result<String, SchemaError> {
        let raw: RawSchemas = self
            .schemas
            .iter()
            .map(|(entity, schema)| (entity.clone(), schema.fields().cloned().collect()))
            .collect();
        Ok(serde_yaml_ng::to_string(&raw)?)
    }

    fn from_raw(raw: RawSchemas) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for (entity, fields) in raw {
            registry.insert(PropertySchema::new(&entity, fields)?);
        }
        Ok(registry)
    }
}

impl SchemaProvider for SchemaRegistry {
    fn property_schema(&self, entity_type: &str) -> Option<&PropertySchema> {
        self.get(entity_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    const SAMPLE_YAML: &str = r#"
notification:
  - { name: short_description, backend: shortDescription }
  - { name: start_date, backend: startDate, type: date }
equipment:
  - { name: id, backend: equipmentId }
"#;

    #[test]
    fn test_from_yaml_keeps_entity_order() {
        let registry = SchemaRegistry::from_yaml_str(SAMPLE_YAML).unwrap();
        let entities: Vec<&str> = registry.entity_types().collect();
        assert_eq!(entities, vec!["notification", "equipment"]);

        let notification = registry.get("notification").unwrap();
        let start_date = notification.field("start_date").unwrap();
        assert_eq!(start_date.backend_name(), "startDate");
        assert_eq!(start_date.field_type(), FieldType::Date);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"alert": [{"name": "severity_code", "backend": "SeverityCode", "type": "integer"}]}"#;
        let registry = SchemaRegistry::from_json_str(json).unwrap();
        let field = registry.get("alert").unwrap().field("severity_code").unwrap();
        assert_eq!(field.field_type(), FieldType::Integer);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let yaml = "notification:\n  - { name: a, type: decimal }\n";
        assert!(matches!(
            SchemaRegistry::from_yaml_str(yaml),
            Err(SchemaError::YamlError(_))
        ));
    }

    #[test]
    fn test_yaml_output_reloads() {
        let registry = SchemaRegistry::from_yaml_str(SAMPLE_YAML).unwrap();
        let yaml = registry.to_yaml_string().unwrap();
        assert_eq!(SchemaRegistry::from_yaml_str(&yaml).unwrap(), registry);
    }

    #[test]
    fn test_insert_replaces_schema() {
        let mut registry = SchemaRegistry::from_yaml_str(SAMPLE_YAML).unwrap();
        let replaced = registry.insert(
            PropertySchema::new("equipment", vec![FieldSpec::new("name", "internalId")]).unwrap(),
        );
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 2);
        assert!(registry.get("equipment").unwrap().contains("name"));
        assert!(!registry.get("equipment").unwrap().contains("id"));
    }
}
