use crate::errors::FilterError;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;

/// A single typed value used in a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "boolean",
            FilterValue::Int(_) => "integer",
            FilterValue::Float(_) => "float",
            FilterValue::Str(_) => "string",
            FilterValue::Date(_) => "date",
            FilterValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Null => write!(f, "null"),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Int(i) => write!(f, "{}", i),
            FilterValue::Float(x) => write!(f, "{}", format_float(*x)),
            FilterValue::Str(s) => write!(f, "{}", s),
            FilterValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FilterValue::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
        }
    }
}

/// Floats always carry a fractional part so they never read back as integers
pub(crate) fn format_float(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}

/// ISO-8601 in UTC with a `Z` suffix; fractional seconds only when present
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string()
}

macro_rules! impl_from_scalar {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for EqualityValue {
                fn from(value: $ty) -> Self {
                    EqualityValue::One(value.into())
                }
            }
        )*
    };
}

impl_from_scalar! {
    &str => |v| FilterValue::Str(v.to_string()),
    String => |v| FilterValue::Str(v),
    bool => |v| FilterValue::Bool(v),
    i32 => |v| FilterValue::Int(i64::from(v)),
    i64 => |v| FilterValue::Int(v),
    u32 => |v| FilterValue::Int(i64::from(v)),
    f64 => |v| FilterValue::Float(v),
    NaiveDate => |v| FilterValue::Date(v),
    DateTime<Utc> => |v| FilterValue::Timestamp(v),
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

impl TryFrom<&JsonValue> for FilterValue {
    type Error = FilterError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Null => Ok(FilterValue::Null),
            JsonValue::Bool(b) => Ok(FilterValue::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(FilterValue::Int)
                .or_else(|| n.as_f64().map(FilterValue::Float))
                .ok_or_else(|| FilterError::UnsupportedValue(n.to_string())),
            JsonValue::String(s) => Ok(FilterValue::Str(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err(FilterError::UnsupportedValue(value.to_string()))
            }
        }
    }
}

/// Right-hand side of an equality filter: one value, or any of several
#[derive(Debug, Clone, PartialEq)]
pub enum EqualityValue {
    One(FilterValue),
    AnyOf(Vec<FilterValue>),
}

impl EqualityValue {
    pub fn values(&self) -> &[FilterValue] {
        match self {
            EqualityValue::One(value) => std::slice::from_ref(value),
            EqualityValue::AnyOf(values) => values,
        }
    }
}

impl From<FilterValue> for EqualityValue {
    fn from(value: FilterValue) -> Self {
        EqualityValue::One(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for EqualityValue {
    fn from(values: Vec<T>) -> Self {
        EqualityValue::AnyOf(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>, const N: usize> From<[T; N]> for EqualityValue {
    fn from(values: [T; N]) -> Self {
        EqualityValue::AnyOf(values.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&JsonValue> for EqualityValue {
    type Error = FilterError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Array(items) => items
                .iter()
                .map(FilterValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(EqualityValue::AnyOf),
            other => FilterValue::try_from(other).map(EqualityValue::One),
        }
    }
}

/// Equality filters in the order they were given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EqualityFilters(IndexMap<String, EqualityValue>);

impl EqualityFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<EqualityValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set the filter for `field`; a repeated field keeps its first position
    pub fn insert(&mut self, field: &str, value: impl Into<EqualityValue>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&EqualityValue> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EqualityValue)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from a JSON object of field -> scalar or array of scalars
    pub fn from_json(value: &JsonValue) -> Result<Self, FilterError> {
        let object = value
            .as_object()
            .ok_or_else(|| FilterError::UnsupportedValue(value.to_string()))?;
        let mut filters = Self::new();
        for (field, value) in object {
            filters.insert(field, EqualityValue::try_from(value)?);
        }
        Ok(filters)
    }
}

impl<K: AsRef<str>, V: Into<EqualityValue>> FromIterator<(K, V)> for EqualityFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (field, value) in iter {
            filters.insert(field.as_ref(), value);
        }
        filters
    }
}
