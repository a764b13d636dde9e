//! Client-side evaluation of a compiled query against JSON records, for
//! endpoints that return unfiltered collections.

use crate::compiler::{Clause, CompiledQuery, Condition, Rhs};
use crate::expression::CompareOp;
use crate::render::parse_temporal;
use crate::value::FilterValue;
use chrono::{DateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

impl CompiledQuery {
    /// Whether `record`, keyed by backend field names, satisfies every clause
    pub fn matches(&self, record: &JsonValue) -> bool {
        self.clauses().iter().all(|clause| clause.matches(record))
    }

    /// The records that satisfy the query, in their original order
    pub fn apply<'r, I>(&self, records: I) -> Vec<&'r JsonValue>
    where
        I: IntoIterator<Item = &'r JsonValue>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

impl Clause {
    pub fn matches(&self, record: &JsonValue) -> bool {
        match self {
            Clause::Condition(condition) => condition.matches(record),
            Clause::AnyOf(conditions) => conditions.iter().any(|c| c.matches(record)),
        }
    }
}

impl Condition {
    pub fn matches(&self, record: &JsonValue) -> bool {
        let left = Scalar::from_json(lookup(record, &self.field));
        let right = match &self.rhs {
            Rhs::Value { value, .. } => Scalar::from_value(value),
            Rhs::Field(other) => Scalar::from_json(lookup(record, other)),
        };
        match left.compare(&right) {
            Some(ordering) => self.op.holds(ordering),
            // Incomparable values are never equal
            None => self.op == CompareOp::NotEqual,
        }
    }
}

/// Field value by name, or by dotted path into nested objects
fn lookup<'r>(record: &'r JsonValue, field: &str) -> Option<&'r JsonValue> {
    if let Some(value) = record.get(field) {
        return Some(value);
    }
    field
        .split('.')
        .try_fold(record, |current, key| current.get(key))
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
    Other,
}

impl Scalar {
    fn from_json(value: Option<&JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => Scalar::Null,
            Some(JsonValue::Bool(b)) => Scalar::Bool(*b),
            Some(JsonValue::Number(n)) => n.as_f64().map_or(Scalar::Other, Scalar::Number),
            Some(JsonValue::String(s)) => Scalar::Text(s.clone()),
            Some(JsonValue::Array(_) | JsonValue::Object(_)) => Scalar::Other,
        }
    }

    fn from_value(value: &FilterValue) -> Self {
        match value {
            FilterValue::Null => Scalar::Null,
            FilterValue::Bool(b) => Scalar::Bool(*b),
            FilterValue::Int(i) => Scalar::Number(*i as f64),
            FilterValue::Float(x) => Scalar::Number(*x),
            FilterValue::Str(s) => Scalar::Text(s.clone()),
            FilterValue::Date(d) => Scalar::Time(d.and_time(NaiveTime::MIN).and_utc()),
            FilterValue::Timestamp(ts) => Scalar::Time(*ts),
        }
    }

    fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Some(Ordering::Equal),
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => match (text_time(a), text_time(b)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            },
            (Scalar::Time(a), Scalar::Time(b)) => Some(a.cmp(b)),
            (Scalar::Number(a), Scalar::Text(b)) => a.partial_cmp(&b.trim().parse::<f64>().ok()?),
            (Scalar::Text(a), Scalar::Number(b)) => a.trim().parse::<f64>().ok()?.partial_cmp(b),
            (Scalar::Time(a), Scalar::Text(b)) => Some(a.cmp(&text_time(b)?)),
            (Scalar::Text(a), Scalar::Time(b)) => Some(text_time(a)?.cmp(b)),
            _ => None,
        }
    }
}

fn text_time(text: &str) -> Option<DateTime<Utc>> {
    match Scalar::from_value(&parse_temporal(text)?) {
        Scalar::Time(ts) => Some(ts),
        _ => None,
    }
}
