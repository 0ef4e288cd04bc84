//! Structured logging system with tracing
//!
//! Provides configurable logging with JSON output and slow query logging

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Number of slow queries kept for reporting
const MAX_SLOW_QUERIES: usize = 1000;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: String,

    /// Enable JSON format output
    pub json_format: bool,

    /// Enable slow query logging
    pub slow_query_logging: bool,

    /// Slow query threshold in milliseconds
    pub slow_query_threshold_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            json_format: false,
            slow_query_logging: true,
            slow_query_threshold_ms: 100,
        }
    }
}

impl LoggingConfig {
    /// Parse log level from string
    pub fn parse_level(&self) -> Level {
        match self.level.to_uppercase().as_str() {
            "ERROR" => Level::ERROR,
            "WARN" => Level::WARN,
            "INFO" => Level::INFO,
            "DEBUG" => Level::DEBUG,
            "TRACE" => Level::TRACE,
            _ => Level::INFO,
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.parse_level().as_str()));

    let subscriber = Registry::default().with(env_filter);

    let installed = if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!(
        "Logging initialized: level={}, json={}, slow_queries={}",
        config.level,
        config.json_format,
        config.slow_query_logging
    );

    Ok(())
}

/// Slow query record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowQuery {
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub operation: String,
    pub query: String,
    pub collection: String,
}

/// Query execution tracker
pub struct QueryTracker {
    start_time: Instant,
    operation: &'static str,
}

/// Slow query logger shared by every collection of a store
#[derive(Debug)]
pub struct SlowQueryLogger {
    threshold: Duration,
    enabled: bool,
    queries: RwLock<Vec<SlowQuery>>,
}

impl SlowQueryLogger {
    /// Create a new slow query logger
    pub fn new(threshold: Duration, enabled: bool) -> Self {
        Self {
            threshold,
            enabled,
            queries: RwLock::new(Vec::new()),
        }
    }

    /// Build a logger from the logging configuration
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.slow_query_threshold_ms),
            config.slow_query_logging,
        )
    }

    /// Start tracking a query
    pub fn start_query(&self, operation: &'static str) -> QueryTracker {
        QueryTracker {
            start_time: Instant::now(),
            operation,
        }
    }

    /// Finish tracking a query and log if slow.
    ///
    /// `describe` renders the query text and is only called for a query
    /// that is recorded.
    pub fn finish_query<F>(&self, tracker: QueryTracker, collection: &str, describe: F)
    where
        F: FnOnce() -> String,
    {
        if !self.enabled {
            return;
        }

        let duration = tracker.start_time.elapsed();
        if duration < self.threshold {
            return;
        }

        let slow_query = SlowQuery {
            timestamp: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            operation: tracker.operation.to_string(),
            query: describe(),
            collection: collection.to_string(),
        };

        tracing::warn!(
            target: "slow_query",
            duration_ms = slow_query.duration_ms,
            operation = %slow_query.operation,
            query = %slow_query.query,
            collection = %slow_query.collection,
            "Slow query detected"
        );

        let mut queries = self.queries.write();
        queries.push(slow_query);

        if queries.len() > MAX_SLOW_QUERIES {
            let len = queries.len();
            queries.drain(0..len - MAX_SLOW_QUERIES);
        }
    }

    /// Get recent slow queries, newest first
    pub fn get_slow_queries(&self, limit: usize) -> Vec<SlowQuery> {
        let queries = self.queries.read();
        queries.iter().rev().take(limit).cloned().collect()
    }

    /// Get slow query statistics
    pub fn get_stats(&self) -> SlowQueryStats {
        let queries = self.queries.read();
        let threshold_ms = self.threshold.as_millis() as u64;

        if queries.is_empty() {
            return SlowQueryStats {
                threshold_ms,
                ..Default::default()
            };
        }

        let total_count = queries.len();
        let total_duration: u64 = queries.iter().map(|q| q.duration_ms).sum();

        SlowQueryStats {
            total_count,
            avg_duration_ms: total_duration / total_count as u64,
            max_duration_ms: queries.iter().map(|q| q.duration_ms).max().unwrap_or(0),
            threshold_ms,
        }
    }
}

impl Default for SlowQueryLogger {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

/// Slow query statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlowQueryStats {
    pub total_count: usize,
    pub avg_duration_ms: u64,
    pub max_duration_ms: u64,
    pub threshold_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "INFO");
        assert_eq!(config.parse_level(), Level::INFO);

        let config = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level(), Level::DEBUG);

        let config = LoggingConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level(), Level::INFO);
    }

    #[test]
    fn test_slow_query_logger() {
        let logger = SlowQueryLogger::new(Duration::from_millis(100), true);

        let tracker = logger.start_query("find");
        logger.finish_query(tracker, "users", || r#"{"status":"active"}"#.to_string());
        assert!(logger.get_slow_queries(10).is_empty());

        let mut tracker = logger.start_query("count_documents");
        tracker.start_time = Instant::now() - Duration::from_millis(200);
        logger.finish_query(tracker, "transactions", || "{}".to_string());

        let slow_queries = logger.get_slow_queries(10);
        assert_eq!(slow_queries.len(), 1);
        assert!(slow_queries[0].duration_ms >= 200);
        assert_eq!(slow_queries[0].collection, "transactions");
        assert_eq!(slow_queries[0].operation, "count_documents");
        assert_eq!(slow_queries[0].query, "{}");

        let stats = logger.get_stats();
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.threshold_ms, 100);
        assert!(stats.max_duration_ms >= 200);
    }

    #[test]
    fn test_disabled_logger_records_nothing() {
        let logger = SlowQueryLogger::new(Duration::ZERO, false);
        let tracker = logger.start_query("find");
        logger.finish_query(tracker, "users", || "{}".to_string());
        assert!(logger.get_slow_queries(10).is_empty());
        assert_eq!(logger.get_stats().total_count, 0);
    }

    #[test]
    fn test_query_text_rendered_only_when_recorded() {
        let rendered = Cell::new(0);
        let describe = || {
            rendered.set(rendered.get() + 1);
            "{}".to_string()
        };

        let disabled = SlowQueryLogger::new(Duration::ZERO, false);
        disabled.finish_query(disabled.start_query("find"), "users", describe);

        let fast = SlowQueryLogger::new(Duration::from_secs(60), true);
        fast.finish_query(fast.start_query("find"), "users", describe);
        assert_eq!(rendered.get(), 0);

        let recording = SlowQueryLogger::new(Duration::ZERO, true);
        recording.finish_query(recording.start_query("find"), "users", describe);
        assert_eq!(rendered.get(), 1);
    }

    #[test]
    fn test_slow_query_history_is_bounded() {
        let logger = SlowQueryLogger::new(Duration::ZERO, true);
        for i in 0..(MAX_SLOW_QUERIES + 5) {
            let tracker = logger.start_query("find");
            logger.finish_query(tracker, "users", || format!("{{\"n\":{}}}", i));
        }
        let recent = logger.get_slow_queries(usize::MAX);
        assert_eq!(recent.len(), MAX_SLOW_QUERIES);
        assert_eq!(recent[0].query, format!("{{\"n\":{}}}", MAX_SLOW_QUERIES + 4));
    }
}
