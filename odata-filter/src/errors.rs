use crate::expression::GRAMMAR;

/// Errors raised while compiling filters into a backend query
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// An extended filter does not match `field operator (field|literal)`
    Parse { expression: String, reason: String },
    UnknownField {
        entity: String,
        field: String,
        suggestion: Option<String>,
    },
    NotFilterable { entity: String, field: String },
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    EmptyValueSet(String),
    UnknownEntityType(String),
    UnsupportedValue(String),
    TooComplex { max_len: usize, required: usize },
}

impl FilterError {
    /// True for errors caused by referencing a field the schema does not allow
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FilterError::UnknownField { .. } | FilterError::NotFilterable { .. }
        )
    }
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::Parse { expression, reason } => write!(
                f,
                "Failed to parse filter entry '{}': {}. Expected format: {}",
                expression, reason, GRAMMAR
            ),
            FilterError::UnknownField {
                entity,
                field,
                suggestion,
            } => {
                write!(f, "Unknown field '{}' for {}", field, entity)?;
                if let Some(suggestion) = suggestion {
                    write!(f, ", did you mean '{}'?", suggestion)?;
                }
                Ok(())
            }
            FilterError::NotFilterable { entity, field } => {
                write!(f, "Filtering on '{}' is not supported for {}", field, entity)
            }
            FilterError::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch for field '{}': expected {}, found {}",
                field, expected, found
            ),
            FilterError::EmptyValueSet(field) => {
                write!(f, "Equality filter on '{}' has an empty set of values", field)
            }
            FilterError::UnknownEntityType(entity) => {
                write!(f, "No property schema known for entity type '{}'", entity)
            }
            FilterError::UnsupportedValue(value) => {
                write!(f, "Unsupported filter value: {}", value)
            }
            FilterError::TooComplex { max_len, required } => write!(
                f,
                "Filter conditions are too complex: at least {} characters are needed but the limit is {}. Please split your query into multiple calls.",
                required, max_len
            ),
        }
    }
}

impl std::error::Error for FilterError {}
