//! Collection management for RationDB

use crate::cursor::Cursor;
use crate::document::{generate_id, Document, Value};
use crate::monitoring::{QueryTracker, SlowQueryLogger};
use crate::query::{Filter, Projection, QueryError, QueryParser};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// Named, insertion-ordered set of documents
///
/// Reads share a read lock; every mutation takes the write lock, so a read
/// never observes a partially applied write. Queries are parsed before any
/// lock is taken.
pub struct Collection {
    /// Collection name
    name: String,
    /// Identity field assigned on insert
    id_field: String,
    /// Stored documents, in insertion order
    documents: RwLock<Vec<Document>>,
    /// Shared slow query logger
    slow_queries: Arc<SlowQueryLogger>,
}

impl Collection {
    /// Create a new, empty collection
    pub fn new(
        name: impl Into<String>,
        id_field: impl Into<String>,
        slow_queries: Arc<SlowQueryLogger>,
    ) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            documents: RwLock::new(Vec::new()),
            slow_queries,
        }
    }

    /// Get collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the identity field
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Insert a document, assigning an identity if it has none.
    /// Returns a copy of the stored document.
    pub fn insert(&self, mut doc: Document) -> Document {
        self.assign_id(&mut doc);
        debug!(collection = %self.name, id = %Self::id_display(&doc, &self.id_field), "insert");

        self.documents.write().push(doc.clone());
        doc
    }

    /// Insert several documents, preserving their order
    pub fn insert_many(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut inserted = Vec::with_capacity(docs.len());
        for mut doc in docs {
            self.assign_id(&mut doc);
            inserted.push(doc);
        }

        debug!(collection = %self.name, count = inserted.len(), "insert_many");
        self.documents.write().extend(inserted.iter().cloned());
        inserted
    }

    /// Return the first document (in storage order) matching `query`.
    /// `Ok(None)` means nothing matched.
    pub fn find_one(
        &self,
        query: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, QueryError> {
        let filter = QueryParser::parse_filter(query)?;
        let projection = self.parse_projection(projection)?;
        let tracker = self.slow_queries.start_query("find_one");

        let found = self
            .documents
            .read()
            .iter()
            .find(|doc| filter.matches(doc))
            .map(|doc| match &projection {
                Some(projection) => projection.apply(doc),
                None => doc.clone(),
            });

        self.finish(tracker, query);
        Ok(found)
    }

    /// Return a cursor over every document matching `query`, in storage
    /// order. The cursor holds copies; later writes do not affect it.
    ///
    /// Sorting the cursor sees whole documents, so a sort field left out of
    /// the projection still orders the results.
    pub fn find(
        &self,
        query: &Document,
        projection: Option<&Document>,
    ) -> Result<Cursor, QueryError> {
        let filter = QueryParser::parse_filter(query)?;
        let projection = self.parse_projection(projection)?;
        Ok(self.find_with(&filter, projection))
    }

    /// Run an already-parsed filter
    pub fn find_with(&self, filter: &Filter, projection: Option<Projection>) -> Cursor {
        let tracker = self.slow_queries.start_query("find");

        let results: Vec<Document> = self
            .documents
            .read()
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();

        trace!(collection = %self.name, matched = results.len(), "find");
        self.slow_queries
            .finish_query(tracker, &self.name, || format!("{:?}", filter));
        Cursor::with_projection(results, projection)
    }

    /// Count documents matching `query`
    pub fn count_documents(&self, query: &Document) -> Result<u64, QueryError> {
        let filter = QueryParser::parse_filter(query)?;
        let tracker = self.slow_queries.start_query("count_documents");

        let count = self
            .documents
            .read()
            .iter()
            .filter(|doc| filter.matches(doc))
            .count() as u64;

        self.finish(tracker, query);
        Ok(count)
    }

    /// Merge `update` into the first matching document. Returns the number
    /// of documents updated (0 or 1).
    ///
    /// The merge is shallow: each top-level key of the update replaces or
    /// adds the field. `{"$set": {...}}` is accepted as well. The identity
    /// field cannot be changed.
    pub fn update_one(&self, query: &Document, update: &Document) -> Result<u64, QueryError> {
        self.update(query, update, false)
    }

    /// Merge `update` into every matching document. Returns the number of
    /// documents updated.
    pub fn update_many(&self, query: &Document, update: &Document) -> Result<u64, QueryError> {
        self.update(query, update, true)
    }

    fn update(&self, query: &Document, update: &Document, multi: bool) -> Result<u64, QueryError> {
        let filter = QueryParser::parse_filter(query)?;
        let changes = QueryParser::parse_update(update)?;
        if changes.contains_key(&self.id_field) {
            return Err(QueryError::InvalidUpdate(format!(
                "identity field '{}' cannot be updated",
                self.id_field
            )));
        }
        let tracker = self
            .slow_queries
            .start_query(if multi { "update_many" } else { "update_one" });

        let mut updated = 0;
        {
            let mut documents = self.documents.write();
            for doc in documents.iter_mut().filter(|doc| filter.matches(doc)) {
                doc.merge(changes.clone());
                updated += 1;
                if !multi {
                    break;
                }
            }
        }

        debug!(collection = %self.name, updated, "update");
        self.finish(tracker, query);
        Ok(updated)
    }

    /// Remove the first matching document. Returns the number removed.
    pub fn delete_one(&self, query: &Document) -> Result<u64, QueryError> {
        let filter = QueryParser::parse_filter(query)?;

        let deleted = {
            let mut documents = self.documents.write();
            match documents.iter().position(|doc| filter.matches(doc)) {
                Some(index) => {
                    documents.remove(index);
                    1
                }
                None => 0,
            }
        };

        debug!(collection = %self.name, deleted, "delete_one");
        Ok(deleted)
    }

    /// Remove every matching document. Returns the number removed.
    pub fn delete_many(&self, query: &Document) -> Result<u64, QueryError> {
        let filter = QueryParser::parse_filter(query)?;

        let deleted = {
            let mut documents = self.documents.write();
            let before = documents.len();
            documents.retain(|doc| !filter.matches(doc));
            (before - documents.len()) as u64
        };

        debug!(collection = %self.name, deleted, "delete_many");
        Ok(deleted)
    }

    fn assign_id(&self, doc: &mut Document) {
        if !doc.contains_key(&self.id_field) {
            doc.insert(self.id_field.clone(), generate_id());
        }
    }

    fn parse_projection(
        &self,
        projection: Option<&Document>,
    ) -> Result<Option<Projection>, QueryError> {
        projection
            .map(|p| QueryParser::parse_projection(p, &self.id_field))
            .transpose()
    }

    fn finish(&self, tracker: QueryTracker, query: &Document) {
        self.slow_queries.finish_query(tracker, &self.name, || {
            query.to_json().unwrap_or_else(|_| format!("{:?}", query))
        });
    }

    fn id_display(doc: &Document, id_field: &str) -> String {
        doc.get(id_field).map(Value::to_string).unwrap_or_default()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("len", &self.len())
            .finish()
    }
}
