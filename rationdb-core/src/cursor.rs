//! Result cursor returned by `Collection::find`
//!
//! A cursor owns a snapshot of the matching documents taken when the query
//! ran. Sorting reorders that snapshot eagerly; nothing ever goes back to the
//! collection, so later writes are invisible to an existing cursor.
//!
//! The snapshot holds whole documents. Sorting sees every field; the
//! projection is applied to the copies handed out by `materialize`.

use crate::document::{Document, Value};
use crate::query::{compare_values, Projection, Sort, SortOrder};
use std::cmp::Ordering;

/// Snapshot view over one query's results
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Matching documents in storage order
    snapshot: Vec<Document>,
    /// Current iteration order as indexes into `snapshot`
    order: Vec<usize>,
    skip: usize,
    projection: Option<Projection>,
}

impl Cursor {
    /// Wrap an already-filtered sequence of documents
    pub fn new(documents: Vec<Document>) -> Self {
        Self::with_projection(documents, None)
    }

    /// Wrap filtered documents whose returned copies are shaped by
    /// `projection`
    pub fn with_projection(documents: Vec<Document>, projection: Option<Projection>) -> Self {
        let order = (0..documents.len()).collect();
        Self {
            snapshot: documents,
            order,
            skip: 0,
            projection,
        }
    }

    /// Sort by a single field. Replaces any earlier sort order.
    pub fn sort(&mut self, field: impl Into<String>, order: SortOrder) -> &mut Self {
        self.sort_by(&Sort::new().add(field, order))
    }

    /// Sort by several fields, most significant first. Replaces any earlier
    /// sort order; an empty `Sort` restores storage order.
    pub fn sort_by(&mut self, sort: &Sort) -> &mut Self {
        let snapshot = &self.snapshot;
        let mut order: Vec<usize> = (0..snapshot.len()).collect();

        // Stable, so ties keep storage order
        order.sort_by(|&a, &b| {
            for (field, direction) in &sort.fields {
                let cmp = sort_cmp(
                    snapshot[a].get_by_path(field),
                    snapshot[b].get_by_path(field),
                );
                let cmp = match direction {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        });

        self.order = order;
        self
    }

    /// Skip the first `n` documents of the current order when materializing
    pub fn skip(&mut self, n: usize) -> &mut Self {
        self.skip = n;
        self
    }

    /// Return up to `limit` documents in the current order (all of them when
    /// `limit` is `None`). Can be called repeatedly; each call reflects the
    /// sort state at that moment.
    pub fn materialize(&self, limit: Option<usize>) -> Vec<Document> {
        self.order
            .iter()
            .skip(self.skip)
            .take(limit.unwrap_or(usize::MAX))
            .map(|&i| match &self.projection {
                Some(projection) => projection.apply(&self.snapshot[i]),
                None => self.snapshot[i].clone(),
            })
            .collect()
    }

    /// Number of documents captured by the query
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

/// Total order used for sorting.
///
/// Numbers and strings compare as in `$gt`/`$lt`. A missing field sorts
/// lowest; otherwise mismatched types order by type rank:
/// null < NaN < number < string < object < array < bool.
pub fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if let (Some(x), Some(y)) = (a, b) {
        if let Some(ordering) = compare_values(x, y) {
            return ordering;
        }
        if let (Value::Bool(x), Value::Bool(y)) = (x, y) {
            return x.cmp(y);
        }
    }
    type_rank(a).cmp(&type_rank(b))
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        // NaN has no numeric order; keep it apart so numbers stay sorted
        Some(Value::Float64(f)) if f.is_nan() => 2,
        Some(Value::Int64(_)) | Some(Value::Float64(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Object(_)) => 5,
        Some(Value::Array(_)) => 6,
        Some(Value::Bool(_)) => 7,
    }
}
