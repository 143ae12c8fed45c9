//! Query predicate vocabulary.
//!
//! Filters are equality/membership/range predicates over top-level document
//! fields. Backends either evaluate them in memory ([`Filter::matches`]) or
//! translate them to SQL over the JSONB body.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A predicate over a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the given value.
    Eq(String, Value),
    /// Field differs from the given value (missing fields match).
    Ne(String, Value),
    /// Field is a member of the given set.
    In(String, Vec<Value>),
    /// Field is less than or equal to the given value.
    ///
    /// Comparison is timestamp-aware: two RFC 3339 strings compare
    /// chronologically rather than lexically.
    Lte(String, Value),
    /// All sub-filters match.
    And(Vec<Filter>),
}

impl Filter {
    /// Convenience constructor for an equality filter on a serializable value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Evaluates this filter against a document.
    ///
    /// Field names may be dotted paths into nested objects (used by the
    /// aggregation pipeline's post-join match stage).
    pub fn matches(&self, doc: &serde_json::Map<String, Value>) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => resolve_path(doc, field) == Some(value),
            Filter::Ne(field, value) => resolve_path(doc, field) != Some(value),
            Filter::In(field, values) => resolve_path(doc, field)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Filter::Lte(field, value) => resolve_path(doc, field)
                .is_some_and(|v| compare_values(v, value) != Ordering::Greater),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

/// Resolves a dotted path (`"event.status"`) into a nested document.
pub fn resolve_path<'a>(doc: &'a serde_json::Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Orders two JSON values for range filters and sorting.
///
/// RFC 3339 timestamp strings compare chronologically, numbers numerically,
/// other strings lexically. Values of incomparable shapes order as equal so
/// that sorting stays stable.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => a.cmp(b),
            }
        }
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => Ordering::Equal,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
