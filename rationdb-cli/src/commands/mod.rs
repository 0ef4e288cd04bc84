//! Line-delimited JSON commands executed against a store

pub mod collection;

use rationdb_core::{Document, QueryError, Store, Value};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

pub use collection::*;

/// One command line. The `op` key selects the operation.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    InsertOne {
        collection: String,
        document: Document,
    },
    InsertMany {
        collection: String,
        documents: Vec<Document>,
    },
    Find {
        collection: String,
        #[serde(default)]
        query: Document,
        projection: Option<Document>,
        /// `[[field, 1|-1], ...]` or `{field: 1|-1}`
        sort: Option<Value>,
        #[serde(default)]
        skip: usize,
        limit: Option<usize>,
    },
    FindOne {
        collection: String,
        #[serde(default)]
        query: Document,
        projection: Option<Document>,
    },
    UpdateOne {
        collection: String,
        #[serde(default)]
        query: Document,
        update: Document,
    },
    UpdateMany {
        collection: String,
        #[serde(default)]
        query: Document,
        update: Document,
    },
    DeleteOne {
        collection: String,
        #[serde(default)]
        query: Document,
    },
    DeleteMany {
        collection: String,
        #[serde(default)]
        query: Document,
    },
    CountDocuments {
        collection: String,
        #[serde(default)]
        query: Document,
    },
    ListCollections,
}

/// Command errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid command: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Parse and run one command line, returning the JSON result object.
/// Failures are reported in the result, never propagated.
pub fn execute_line(store: &Store, line: &str) -> JsonValue {
    let outcome = serde_json::from_str::<Command>(line)
        .map_err(CommandError::from)
        .and_then(|command| execute_command(store, command));

    match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!("Command failed: {}", e);
            json!({"ok": false, "error": e.to_string()})
        }
    }
}

/// Run a parsed command
pub fn execute_command(store: &Store, command: Command) -> Result<JsonValue, CommandError> {
    debug!(?command, "Executing command");

    match command {
        Command::InsertOne { collection, document } => {
            Ok(insert_one(&store.collection(&collection), document))
        }
        Command::InsertMany { collection, documents } => {
            Ok(insert_many(&store.collection(&collection), documents))
        }
        Command::Find {
            collection,
            query,
            projection,
            sort,
            skip,
            limit,
        } => find(
            &store.collection(&collection),
            &query,
            projection.as_ref(),
            sort.as_ref(),
            skip,
            limit,
        ),
        Command::FindOne {
            collection,
            query,
            projection,
        } => find_one(&store.collection(&collection), &query, projection.as_ref()),
        Command::UpdateOne {
            collection,
            query,
            update,
        } => collection::update(&store.collection(&collection), &query, &update, false),
        Command::UpdateMany {
            collection,
            query,
            update,
        } => collection::update(&store.collection(&collection), &query, &update, true),
        Command::DeleteOne { collection, query } => {
            delete(&store.collection(&collection), &query, false)
        }
        Command::DeleteMany { collection, query } => {
            delete(&store.collection(&collection), &query, true)
        }
        Command::CountDocuments { collection, query } => {
            count_documents(&store.collection(&collection), &query)
        }
        Command::ListCollections => Ok(json!({
            "ok": true,
            "collections": store.collection_names(),
        })),
    }
}
