/// Errors raised while building or loading entity schemas
#[derive(Debug)]
pub enum SchemaError {
    IoError(std::io::Error),
    YamlError(serde_yaml_ng::Error),
    JsonError(serde_json::Error),
    DuplicateField { entity: String, field: String },
    UnsupportedFormat(String),
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::IoError(err)
    }
}

impl From<serde_yaml_ng::Error> for SchemaError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SchemaError::YamlError(err)
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::JsonError(err)
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::IoError(err) => write!(f, "IO error: {}", err),
            SchemaError::YamlError(err) => write!(f, "YAML error: {}", err),
            SchemaError::JsonError(err) => write!(f, "JSON error: {}", err),
            SchemaError::DuplicateField { entity, field } => {
                write!(f, "Field '{}' is defined more than once for {}", field, entity)
            }
            SchemaError::UnsupportedFormat(name) => write!(
                f,
                "Unsupported schema file '{}', expected a .yaml, .yml or .json extension",
                name
            ),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::IoError(err) => Some(err),
            SchemaError::YamlError(err) => Some(err),
            SchemaError::JsonError(err) => Some(err),
            SchemaError::DuplicateField { .. } | SchemaError::UnsupportedFormat(_) => None,
        }
    }
}
