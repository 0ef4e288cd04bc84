//! Seed a store from a JSON file
//!
//! The file is one object mapping collection names to arrays of documents:
//! `{"beneficiaries": [{...}, ...], "shops": [...]}`

use anyhow::{Context, Result};
use rationdb_core::{Document, Store};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Insert every document of the seed file. Returns the number inserted.
pub fn load_seed(store: &Store, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: BTreeMap<String, Vec<Document>> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    let mut total = 0;
    for (name, documents) in seed {
        let count = documents.len();
        store.collection(&name).insert_many(documents);
        info!("Seeded {} documents into '{}'", count, name);
        total += count;
    }

    Ok(total)
}
