use crate::errors::SchemaError;
use crate::registry::SchemaRegistry;

const BUILTIN_SCHEMAS: &str = include_str!("../schemas/builtin.yaml");

impl SchemaRegistry {
    /// Schemas for the AssetCentral and PAI entities shipped with Sailor
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_yaml_str(BUILTIN_SCHEMAS)
    }
}
