use crate::errors::SchemaError;
use crate::field::FieldSpec;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use strsim::jaro_winkler;

const SUGGESTION_THRESHOLD: f64 = 0.85;

/// The known properties of one entity type, keyed by our field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    entity: String,
    fields: IndexMap<String, FieldSpec>,
}

impl PropertySchema {
    pub fn new(entity: &str, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut by_name = IndexMap::with_capacity(fields.len());
        for field in fields {
            let name = field.name().to_string();
            if by_name.insert(name.clone(), field).is_some() {
                return Err(SchemaError::DuplicateField {
                    entity: entity.to_string(),
                    field: name,
                });
            }
        }
        Ok(Self {
            entity: entity.to_string(),
            fields: by_name,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All fields, in definition order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the exposed fields
    pub fn available_properties(&self) -> BTreeSet<String> {
        self.fields
            .values()
            .filter(|field| field.is_exposed())
            .map(|field| field.name().to_string())
            .collect()
    }

    /// Closest exposed field name to `name`, if any is reasonably similar
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.fields
            .values()
            .filter(|field| field.is_exposed())
            .map(|field| (jaro_winkler(name, field.name()), field.name()))
            .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate.to_string())
    }
}

/// Source of property schemas, looked up by entity type name
pub trait SchemaProvider {
    fn property_schema(&self, entity_type: &str) -> Option<&PropertySchema>;

    fn available_properties(&self, entity_type: &str) -> BTreeSet<String> {
        self.property_schema(entity_type)
            .map(PropertySchema::available_properties)
            .unwrap_or_default()
    }
}

/// A lone schema serves its own entity type
impl SchemaProvider for PropertySchema {
    fn property_schema(&self, entity_type: &str) -> Option<&PropertySchema> {
        (self.entity == entity_type).then_some(self)
    }
}
