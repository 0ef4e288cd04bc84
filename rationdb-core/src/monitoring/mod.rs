//! Monitoring for RationDB
//!
//! Structured logging with tracing and slow query tracking

pub mod logging;

pub use logging::*;
