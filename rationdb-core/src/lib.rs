//! RationDB Core - embedded in-memory document store
//!
//! This crate provides:
//! - Schemaless documents with insertion-ordered fields
//! - A Mongo-style query subset (comparison, `$in`, `$regex`, `$or`)
//! - Named collections with snapshot cursors
//! - A store registry, configuration and structured logging

pub mod config;
pub mod cursor;
pub mod document;
pub mod monitoring;
pub mod query;
pub mod storage;
pub mod store;

pub use config::*;
pub use cursor::*;
pub use document::*;
pub use monitoring::*;
pub use query::*;
pub use storage::*;
pub use store::*;
