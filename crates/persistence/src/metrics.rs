//! Record store metrics collection.
//!
//! Provides functions for recording store-related metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record store call duration.
///
/// Call this function after a store request completes to record its duration.
pub fn record_query_duration(table: &str, operation: &str, duration_secs: f64) {
    histogram!(
        "record_store_request_duration_seconds",
        "table" => table.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Record a failed store call.
pub fn record_query_failure(table: &str, operation: &str) {
    counter!(
        "record_store_failures_total",
        "table" => table.to_string(),
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// A helper to time store operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("Devices", "select");
/// let result = client.get(url).send().await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    table: String,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for an operation on the given table.
    pub fn new(table: impl Into<String>, operation: &'static str) -> Self {
        Self {
            table: table.into(),
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.table, self.operation, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_creation() {
        let timer = QueryTimer::new("Devices", "select");
        assert_eq!(timer.table, "Devices");
        assert_eq!(timer.operation, "select");
    }

    #[test]
    fn test_query_timer_record_without_recorder() {
        // No global recorder installed: recording is a no-op.
        QueryTimer::new(String::from("Request"), "update").record();
        record_query_failure("Request", "update");
    }
}
