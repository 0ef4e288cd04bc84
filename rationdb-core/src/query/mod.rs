//! Query engine for RationDB
//!
//! This module provides Mongo-style query parsing and matching

pub mod ast;
pub mod matcher;
pub mod parser;

pub use ast::{Filter, Projection, ProjectionType, Sort, SortOrder};
pub use matcher::{compare_values, matches};
pub use parser::{QueryError, QueryParser};
