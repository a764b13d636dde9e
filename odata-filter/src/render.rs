//! Rendering of typed values into OData literals according to the field type.

use crate::errors::FilterError;
use crate::value::{format_float, format_timestamp, FilterValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use entity_schema::{FieldSpec, FieldType};
use log::warn;

/// Single-quoted OData string literal; embedded quotes are doubled
pub(crate) fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Convert `value` to the form `field` stores it in, e.g. a timestamp cast
/// to a date or a boolean stored as `"1"`
pub(crate) fn convert_literal(
    entity: &str,
    field: &FieldSpec,
    value: &FilterValue,
) -> Result<FilterValue, FilterError> {
    if let FilterValue::Float(x) = value {
        if !x.is_finite() {
            return Err(mismatch(field, "a finite number", value));
        }
    }
    if value.is_null() && field.field_type().is_filterable() {
        return Ok(FilterValue::Null);
    }

    match field.field_type() {
        FieldType::String => Ok(value.clone()),
        FieldType::Integer => match value {
            FilterValue::Int(_) => Ok(value.clone()),
            other => Err(mismatch(field, "an integer", other)),
        },
        FieldType::Double => match value {
            FilterValue::Int(_) | FilterValue::Float(_) => Ok(value.clone()),
            other => Err(mismatch(field, "a number", other)),
        },
        FieldType::Boolean => match value {
            FilterValue::Bool(_) => Ok(value.clone()),
            other => Err(mismatch(field, "a boolean", other)),
        },
        FieldType::Date => to_date(field, value).map(FilterValue::Date),
        FieldType::Timestamp | FieldType::DateTimeOffset => {
            to_timestamp(field, value).map(FilterValue::Timestamp)
        }
        FieldType::BooleanIntString => match value {
            FilterValue::Bool(b) => Ok(FilterValue::Str(if *b { "1" } else { "0" }.to_string())),
            FilterValue::Int(i @ (0 | 1)) => Ok(FilterValue::Str(i.to_string())),
            other => Err(mismatch(field, "a boolean or 0/1", other)),
        },
        FieldType::NonFilterable => Err(FilterError::NotFilterable {
            entity: entity.to_string(),
            field: field.name().to_string(),
        }),
    }
}

/// OData literal for a value already converted by [`convert_literal`]
pub(crate) fn format_literal(field_type: FieldType, value: &FilterValue) -> String {
    match (field_type, value) {
        (_, FilterValue::Null) => "null".to_string(),
        (FieldType::Double, number) => format!("{}d", bare(number)),
        (FieldType::DateTimeOffset, FilterValue::Timestamp(ts)) => {
            format!("datetimeoffset'{}'", format_timestamp(ts))
        }
        (_, FilterValue::Str(s)) => quote(s),
        (_, FilterValue::Date(d)) => quote(&format_date(d)),
        (_, FilterValue::Timestamp(ts)) => quote(&format_timestamp(ts)),
        (_, other) => bare(other),
    }
}

fn bare(value: &FilterValue) -> String {
    match value {
        FilterValue::Float(x) => format_float(*x),
        other => other.to_string(),
    }
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn mismatch(field: &FieldSpec, expected: &str, found: &FilterValue) -> FilterError {
    FilterError::TypeMismatch {
        field: field.name().to_string(),
        expected: format!("{} ({} field)", expected, field.field_type()),
        found: format!("{} {}", found.kind(), found),
    }
}

fn to_date(field: &FieldSpec, value: &FilterValue) -> Result<NaiveDate, FilterError> {
    let temporal = match value {
        FilterValue::Str(s) => parse_temporal(s),
        FilterValue::Date(_) | FilterValue::Timestamp(_) => Some(value.clone()),
        _ => None,
    };
    match temporal {
        Some(FilterValue::Date(date)) => Ok(date),
        Some(FilterValue::Timestamp(ts)) => {
            if ts.time() != NaiveTime::MIN {
                warn!(
                    "Casting timestamp {} to a date for field '{}', the time of day is dropped",
                    format_timestamp(&ts),
                    field.name()
                );
            }
            Ok(ts.date_naive())
        }
        _ => Err(mismatch(field, "a date", value)),
    }
}

fn to_timestamp(field: &FieldSpec, value: &FilterValue) -> Result<DateTime<Utc>, FilterError> {
    let temporal = match value {
        FilterValue::Str(s) => parse_temporal(s),
        FilterValue::Date(_) | FilterValue::Timestamp(_) => Some(value.clone()),
        _ => None,
    };
    match temporal {
        Some(FilterValue::Timestamp(ts)) => Ok(ts),
        Some(FilterValue::Date(date)) => Ok(date.and_time(NaiveTime::MIN).and_utc()),
        _ => Err(mismatch(field, "a timestamp", value)),
    }
}

/// Parse an ISO-8601 date or timestamp. Timestamps without an offset are
/// taken as UTC.
pub(crate) fn parse_temporal(text: &str) -> Option<FilterValue> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(FilterValue::Timestamp(ts.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            warn!("Timestamp '{}' has no timezone, assuming UTC", text);
            return Some(FilterValue::Timestamp(naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(FilterValue::Date)
}
