//! Query Abstract Syntax Tree (AST) definitions
//!
//! Defines the compiled form of a query specification: filters,
//! projections and sort orders.

use crate::document::{Document, Value};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use super::parser::QueryError;

/// Filter conditions for queries
#[derive(Debug, Clone)]
pub enum Filter {
    /// Empty filter (matches all documents)
    Empty,

    /// Equality: field == value
    Eq { field: String, value: Value },

    /// Not equal: field != value
    Ne { field: String, value: Value },

    /// Greater than: field > value
    Gt { field: String, value: Value },

    /// Greater than or equal: field >= value
    Gte { field: String, value: Value },

    /// Less than: field < value
    Lt { field: String, value: Value },

    /// Less than or equal: field <= value
    Lte { field: String, value: Value },

    /// In: field in [values]
    In { field: String, values: Vec<Value> },

    /// Not in: field not in [values]
    Nin { field: String, values: Vec<Value> },

    /// Exists: field exists (or not)
    Exists { field: String, exists: bool },

    /// Regex: string field contains a match of the pattern (case-insensitive)
    Regex { field: String, regex: Regex },

    /// Logical AND: all conditions must match
    And(Vec<Filter>),

    /// Logical OR: at least one condition must match
    Or(Vec<Filter>),
}

impl Filter {
    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-equal filter
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal filter
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal filter
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an in filter
    pub fn in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            values,
        }
    }

    /// Create a not-in filter
    pub fn nin(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Nin {
            field: field.into(),
            values,
        }
    }

    /// Create an exists filter
    pub fn exists(field: impl Into<String>, exists: bool) -> Self {
        Self::Exists {
            field: field.into(),
            exists,
        }
    }

    /// Create a case-insensitive regex filter
    pub fn regex(field: impl Into<String>, pattern: &str) -> Result<Self, QueryError> {
        Self::regex_with_options(field, pattern, "")
    }

    /// Create a regex filter with Mongo-style option flags (`i`, `m`, `s`, `x`).
    /// Case-insensitivity is always on.
    pub fn regex_with_options(
        field: impl Into<String>,
        pattern: &str,
        options: &str,
    ) -> Result<Self, QueryError> {
        let mut builder = RegexBuilder::new(pattern);
        builder.case_insensitive(true);

        for flag in options.chars() {
            match flag {
                'i' => {}
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                other => {
                    return Err(QueryError::InvalidFormat(format!(
                        "unsupported $options flag '{}'",
                        other
                    )))
                }
            }
        }

        let regex = builder
            .build()
            .map_err(|e| QueryError::InvalidRegex(e.to_string()))?;

        Ok(Self::Regex {
            field: field.into(),
            regex,
        })
    }

    /// Check if this filter is empty (matches all)
    pub fn is_empty(&self) -> bool {
        matches!(self, Filter::Empty)
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Empty
    }
}

/// Projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// Include the field
    Include,
    /// Exclude the field
    Exclude,
}

/// Projection specification (top-level fields to include/exclude)
///
/// The identity field is kept in inclusion mode unless it is explicitly
/// excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    fields: IndexMap<String, ProjectionType>,
    id_field: String,
}

impl Projection {
    /// Create an empty projection for documents keyed by `id_field`
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            fields: IndexMap::new(),
            id_field: id_field.into(),
        }
    }

    /// Include a field
    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), ProjectionType::Include);
        self
    }

    /// Exclude a field
    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), ProjectionType::Exclude);
        self
    }

    /// Check if this is an inclusion projection
    pub fn is_inclusion(&self) -> bool {
        self.fields.values().any(|t| *t == ProjectionType::Include)
    }

    /// Check if any field is excluded
    pub fn is_exclusion(&self) -> bool {
        self.fields.values().any(|t| *t == ProjectionType::Exclude)
    }

    /// Fields named by this projection
    pub fn fields(&self) -> impl Iterator<Item = (&str, ProjectionType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check if a field should be included
    pub fn should_include(&self, field: &str) -> bool {
        let rule = self.fields.get(field);
        if self.is_inclusion() {
            match rule {
                Some(ProjectionType::Include) => true,
                Some(ProjectionType::Exclude) => false,
                None => field == self.id_field,
            }
        } else {
            rule != Some(&ProjectionType::Exclude)
        }
    }

    /// Build a projected copy of `doc`. The source is left untouched.
    pub fn apply(&self, doc: &Document) -> Document {
        doc.iter()
            .filter(|(field, _)| self.should_include(field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (1)
    Ascending,
    /// Descending order (-1)
    Descending,
}

impl SortOrder {
    /// Map a Mongo-style direction: positive is ascending, negative descending
    pub fn from_direction(direction: i64) -> Option<Self> {
        match direction {
            d if d > 0 => Some(SortOrder::Ascending),
            d if d < 0 => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    /// Fields to sort by with their order, most significant first
    pub fields: Vec<(String, SortOrder)>,
}

impl Sort {
    /// Create a new empty sort
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to sort by
    pub fn add(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.fields.push((field.into(), order));
        self
    }

    /// Sort by field in ascending order
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.add(field, SortOrder::Ascending)
    }

    /// Sort by field in descending order
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.add(field, SortOrder::Descending)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
