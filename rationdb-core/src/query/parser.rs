//! Query parser for converting query specification documents into the AST
//!
//! Parses Mongo-style filters, projections, sorts and update documents.

use super::ast::{Filter, Projection, ProjectionType, Sort, SortOrder};
use crate::document::{Document, Value};

/// Query parser for query specification documents
pub struct QueryParser;

impl QueryParser {
    /// Parse a filter from a JSON string
    pub fn parse_filter_json(json: &str) -> Result<Filter, QueryError> {
        let query =
            Document::from_json(json).map_err(|e| QueryError::InvalidJson(e.to_string()))?;
        Self::parse_filter(&query)
    }

    /// Parse a filter from a query specification document.
    ///
    /// Top-level keys are combined with AND. `$or` and `$and` take a
    /// sequence of nested specifications.
    pub fn parse_filter(query: &Document) -> Result<Filter, QueryError> {
        let mut filters = Vec::with_capacity(query.len());

        for (key, val) in query {
            let filter = if key.starts_with('$') {
                match key.as_str() {
                    "$or" => Filter::Or(Self::parse_clauses(key, val)?),
                    "$and" => Filter::And(Self::parse_clauses(key, val)?),
                    _ => return Err(QueryError::UnsupportedOperator(key.clone())),
                }
            } else {
                Self::parse_field_condition(key, val)?
            };
            filters.push(filter);
        }

        Ok(match filters.len() {
            0 => Filter::Empty,
            1 => filters.pop().unwrap_or_default(),
            _ => Filter::And(filters),
        })
    }

    /// Parse the array of nested specifications under `$or` / `$and`
    fn parse_clauses(op: &str, value: &Value) -> Result<Vec<Filter>, QueryError> {
        let arr = value
            .as_array()
            .ok_or_else(|| QueryError::InvalidFormat(format!("{} must be an array", op)))?;

        arr.iter()
            .map(|clause| match clause {
                Value::Object(doc) => Self::parse_filter(doc),
                other => Err(QueryError::InvalidFormat(format!(
                    "{} clauses must be objects, found {}",
                    op,
                    other.type_name()
                ))),
            })
            .collect()
    }

    /// Parse a field condition
    fn parse_field_condition(field: &str, value: &Value) -> Result<Filter, QueryError> {
        let ops = match value {
            Value::Object(ops) => ops,
            // Direct value comparison (equality)
            _ => return Ok(Filter::eq(field, value.clone())),
        };

        let operator_keys = ops.keys().filter(|k| k.starts_with('$')).count();
        if operator_keys == 0 {
            // Nested document literal
            return Ok(Filter::eq(field, value.clone()));
        }
        if operator_keys != ops.len() {
            return Err(QueryError::InvalidFormat(format!(
                "field '{}' mixes operators and plain keys",
                field
            )));
        }

        let mut filters = Vec::with_capacity(ops.len());

        for (op, val) in ops {
            let filter = match op.as_str() {
                "$eq" => Filter::eq(field, val.clone()),
                "$ne" => Filter::ne(field, val.clone()),
                "$gt" => Filter::gt(field, val.clone()),
                "$gte" => Filter::gte(field, val.clone()),
                "$lt" => Filter::lt(field, val.clone()),
                "$lte" => Filter::lte(field, val.clone()),
                "$in" => Filter::in_values(field, Self::operand_array(op, val)?),
                "$nin" => Filter::nin(field, Self::operand_array(op, val)?),
                "$exists" => {
                    let exists = val.as_bool().ok_or_else(|| {
                        QueryError::InvalidFormat("$exists must be a boolean".to_string())
                    })?;
                    Filter::exists(field, exists)
                }
                "$regex" => {
                    let pattern = val.as_str().ok_or_else(|| {
                        QueryError::InvalidFormat("$regex must be a string".to_string())
                    })?;
                    let options = match ops.get("$options") {
                        None => "",
                        Some(Value::String(s)) => s.as_str(),
                        Some(_) => {
                            return Err(QueryError::InvalidFormat(
                                "$options must be a string".to_string(),
                            ))
                        }
                    };
                    Filter::regex_with_options(field, pattern, options)?
                }
                "$options" => {
                    if !ops.contains_key("$regex") {
                        return Err(QueryError::InvalidFormat(
                            "$options requires $regex".to_string(),
                        ));
                    }
                    continue;
                }
                _ => {
                    return Err(QueryError::UnsupportedOperator(op.clone()));
                }
            };
            filters.push(filter);
        }

        Ok(if filters.len() == 1 {
            filters.pop().unwrap_or_default()
        } else {
            Filter::And(filters)
        })
    }

    fn operand_array(op: &str, value: &Value) -> Result<Vec<Value>, QueryError> {
        value
            .as_array()
            .cloned()
            .ok_or_else(|| QueryError::InvalidFormat(format!("{} must be an array", op)))
    }

    /// Parse a projection document: `{field: 1|true}` includes,
    /// `{field: 0|false}` excludes. Inclusion and exclusion cannot be mixed,
    /// except for excluding the identity field.
    pub fn parse_projection(
        projection: &Document,
        id_field: &str,
    ) -> Result<Projection, QueryError> {
        let mut result = Projection::new(id_field);

        for (field, val) in projection {
            let include = match val {
                Value::Bool(b) => *b,
                Value::Int64(0) => false,
                Value::Int64(1) => true,
                _ => {
                    return Err(QueryError::InvalidProjection(format!(
                        "value for '{}' must be 0, 1, true, or false",
                        field
                    )))
                }
            };

            result = if include {
                result.include(field.clone())
            } else {
                result.exclude(field.clone())
            };
        }

        let has_inclusion = result.is_inclusion();
        let has_non_id_exclusion = result
            .fields()
            .any(|(k, t)| k != id_field && t == ProjectionType::Exclude);

        if has_inclusion && has_non_id_exclusion {
            return Err(QueryError::InvalidProjection(format!(
                "cannot mix inclusion and exclusion (except {})",
                id_field
            )));
        }

        Ok(result)
    }

    /// Parse a sort specification.
    ///
    /// Accepts either a document (`{"created_at": -1, "name": 1}`) or an
    /// array of `[field, direction]` pairs. Directions may be numbers or
    /// the strings `asc`/`desc`.
    pub fn parse_sort(value: &Value) -> Result<Sort, QueryError> {
        let mut sort = Sort::new();

        match value {
            Value::Object(doc) => {
                for (field, dir) in doc {
                    sort = sort.add(field.clone(), Self::parse_sort_order(dir)?);
                }
            }
            Value::Array(pairs) => {
                for pair in pairs {
                    match pair.as_array().map(Vec::as_slice) {
                        Some([Value::String(field), dir]) => {
                            sort = sort.add(field.clone(), Self::parse_sort_order(dir)?);
                        }
                        _ => {
                            return Err(QueryError::InvalidFormat(
                                "sort entries must be [field, direction] pairs".to_string(),
                            ))
                        }
                    }
                }
            }
            _ => {
                return Err(QueryError::InvalidFormat(
                    "sort must be an object or an array".to_string(),
                ))
            }
        }

        Ok(sort)
    }

    fn parse_sort_order(value: &Value) -> Result<SortOrder, QueryError> {
        let order = match value {
            Value::Int64(n) => SortOrder::from_direction(*n),
            Value::String(s) => match s.as_str() {
                "asc" | "ascending" => Some(SortOrder::Ascending),
                "desc" | "descending" => Some(SortOrder::Descending),
                _ => None,
            },
            _ => None,
        };

        order.ok_or_else(|| {
            QueryError::InvalidFormat("Sort value must be 1, -1, 'asc', or 'desc'".to_string())
        })
    }

    /// Parse an update document into the fields to merge.
    ///
    /// Either a plain document (every key merged) or `{"$set": {...}}`.
    pub fn parse_update(update: &Document) -> Result<Document, QueryError> {
        if !update.keys().any(|k| k.starts_with('$')) {
            return Ok(update.clone());
        }

        let mut merged = Document::new();
        for (key, val) in update {
            match (key.as_str(), val) {
                ("$set", Value::Object(fields)) => merged.merge(fields.clone()),
                ("$set", other) => {
                    return Err(QueryError::InvalidUpdate(format!(
                        "$set must be an object, found {}",
                        other.type_name()
                    )))
                }
                (op, _) if op.starts_with('$') => {
                    return Err(QueryError::UnsupportedOperator(op.to_string()))
                }
                (field, _) => {
                    return Err(QueryError::InvalidUpdate(format!(
                        "plain field '{}' cannot be combined with update operators",
                        field
                    )))
                }
            }
        }

        Ok(merged)
    }
}

/// Malformed query errors.
///
/// These indicate a bug in the code building the query, never a data
/// condition, and are not meant to be recovered from silently.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),
}
