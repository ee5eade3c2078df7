//! Observability hooks for store operations.
//!
//! Implement [`StoreMetrics`] to feed timings and failures into a monitoring
//! system:
//!
//! ```ignore
//! use watch_store::observability::StoreMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl StoreMetrics for PrometheusMetrics {
//!     fn record_read(&self, operation: &str, duration: Duration) {
//!         // histogram!("store_read_seconds", "op" => operation).record(duration);
//!     }
//!     // ... implement other methods
//! }
//!
//! // let store = DocumentStore::new(backend)
//! //     .with_metrics(PrometheusMetrics);
//! ```
//!
//! The default methods log through the `log` crate; [`LogMetrics`] uses them
//! as-is. [`NoOpMetrics`] is installed unless another is given.

use std::time::Duration;

/// Trait for store metrics collection.
///
/// `operation` is one of `list_all`, `find_by_id`, `create`, `update`,
/// `delete`.
pub trait StoreMetrics: Send + Sync {
    /// Record a successful read.
    fn record_read(&self, operation: &str, duration: Duration) {
        debug!("Store READ {} took {:?}", operation, duration);
    }

    /// Record a successful create or update.
    fn record_write(&self, operation: &str, duration: Duration) {
        debug!("Store WRITE {} took {:?}", operation, duration);
    }

    /// Record a successful delete.
    fn record_delete(&self, operation: &str, duration: Duration) {
        debug!("Store DELETE {} took {:?}", operation, duration);
    }

    /// Record a failed operation, including not-found and rejected writes.
    fn record_error(&self, operation: &str, error: &str) {
        warn!("Store ERROR in {}: {}", operation, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl StoreMetrics for NoOpMetrics {
    fn record_read(&self, _operation: &str, _duration: Duration) {}
    fn record_write(&self, _operation: &str, _duration: Duration) {}
    fn record_delete(&self, _operation: &str, _duration: Duration) {}
    fn record_error(&self, _operation: &str, _error: &str) {}
}

/// Metrics that only log.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl StoreMetrics for LogMetrics {}
