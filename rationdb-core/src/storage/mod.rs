//! Storage layer: in-memory collections

pub mod collection;

pub use collection::*;
