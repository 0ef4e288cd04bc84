//! Query matcher: decides whether a document satisfies a filter
//!
//! Matching never fails. Type mismatches and absent fields resolve to
//! "no match"; only parsing a malformed specification reports an error.

use super::ast::Filter;
use super::parser::{QueryError, QueryParser};
use crate::document::{Document, Value};
use std::cmp::Ordering;

/// Parse `query` and test it against `doc`
pub fn matches(doc: &Document, query: &Document) -> Result<bool, QueryError> {
    Ok(QueryParser::parse_filter(query)?.matches(doc))
}

/// Order two values for `$gt`/`$gte`/`$lt`/`$lte`.
///
/// Only numbers (against numbers) and strings (against strings) are
/// ordered; every other pairing returns `None`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

impl Filter {
    /// Check if a document matches this filter.
    ///
    /// An absent field fails every field condition except `$exists: false`.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Empty => true,

            Filter::Eq { field, value } => doc.get_by_path(field).map_or(false, |v| v == value),

            Filter::Ne { field, value } => doc.get_by_path(field).map_or(false, |v| v != value),

            Filter::Gt { field, value } => {
                Self::ordered(doc, field, value, |o| o == Ordering::Greater)
            }

            Filter::Gte { field, value } => {
                Self::ordered(doc, field, value, |o| o != Ordering::Less)
            }

            Filter::Lt { field, value } => {
                Self::ordered(doc, field, value, |o| o == Ordering::Less)
            }

            Filter::Lte { field, value } => {
                Self::ordered(doc, field, value, |o| o != Ordering::Greater)
            }

            Filter::In { field, values } => {
                doc.get_by_path(field).map_or(false, |v| values.contains(v))
            }

            Filter::Nin { field, values } => {
                doc.get_by_path(field).map_or(false, |v| !values.contains(v))
            }

            Filter::Exists { field, exists } => doc.get_by_path(field).is_some() == *exists,

            Filter::Regex { field, regex } => match doc.get_by_path(field) {
                Some(Value::String(s)) => regex.is_match(s),
                _ => false,
            },

            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),

            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    fn ordered(
        doc: &Document,
        field: &str,
        value: &Value,
        accept: impl Fn(Ordering) -> bool,
    ) -> bool {
        doc.get_by_path(field)
            .and_then(|v| compare_values(v, value))
            .map_or(false, accept)
    }
}
