//! Store: the registry of named collections

use crate::config::StoreConfig;
use crate::monitoring::SlowQueryLogger;
use crate::storage::Collection;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory document store
///
/// Collections are created on first access and live as long as the store.
/// Looking up the same name twice yields the same collection.
pub struct Store {
    config: StoreConfig,
    /// Collections by name
    collections: DashMap<String, Arc<Collection>>,
    /// Slow query log shared by every collection
    slow_queries: Arc<SlowQueryLogger>,
}

impl Store {
    /// Create a store with default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with the given configuration
    pub fn with_config(config: StoreConfig) -> Self {
        let slow_queries = Arc::new(SlowQueryLogger::from_config(&config.logging));
        info!(id_field = %config.id_field, "Store created");

        Self {
            config,
            collections: DashMap::new(),
            slow_queries,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get a collection by name, creating it empty if it does not exist
    pub fn collection(&self, name: &str) -> Arc<Collection> {
        if let Some(existing) = self.collections.get(name) {
            return Arc::clone(existing.value());
        }

        let entry = self.collections.entry(name.to_string()).or_insert_with(|| {
            debug!(collection = name, "Creating collection");
            Arc::new(Collection::new(
                name,
                self.config.id_field.clone(),
                Arc::clone(&self.slow_queries),
            ))
        });
        Arc::clone(entry.value())
    }

    /// Names of every collection created so far, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Slow query log for this store
    pub fn slow_query_logger(&self) -> &Arc<SlowQueryLogger> {
        &self.slow_queries
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    #[test]
    fn test_same_name_same_collection() {
        let store = Store::new();
        let first = store.collection("beneficiaries");
        let second = store.collection("beneficiaries");
        assert!(Arc::ptr_eq(&first, &second));

        first.insert(Document::new().with("name", "Alice"));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_collections_are_independent() {
        let store = Store::new();
        store.collection("shops").insert(Document::new().with("shop_id", "S1"));

        let transactions = store.collection("transactions");
        assert!(transactions.is_empty());
        assert_eq!(store.collection("shops").len(), 1);
    }

    #[test]
    fn test_collection_names_sorted() {
        let store = Store::new();
        store.collection("transactions");
        store.collection("alerts");
        store.collection("shops");
        store.collection("alerts");
        assert_eq!(store.collection_names(), vec!["alerts", "shops", "transactions"]);
    }

    #[test]
    fn test_configured_id_field() {
        let config = StoreConfig {
            id_field: "_id".to_string(),
            ..Default::default()
        };
        let store = Store::with_config(config);
        let stored = store
            .collection("users")
            .insert(Document::try_from(json!({"name": "Bob"})).unwrap());

        assert!(stored.contains_key("_id"));
        assert!(!stored.contains_key("id"));
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Store>();
        assert_send_sync::<Collection>();
    }
}
