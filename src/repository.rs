//! Repository trait the HTTP layer is written against.
//!
//! `WatchRepository` decouples the routes from any particular storage. The
//! crate's own implementation is [`crate::DocumentStore`]; tests plug in
//! fakes (for instance one that always fails) to exercise error mapping.
//!
//! # Error Handling
//!
//! Implementations return:
//! - `StoreError::NotFound` when no document has the requested `id`
//! - `StoreError::Validation` for rejected payloads and uniqueness conflicts
//! - `StoreError::Unavailable` (or an encoding error) for storage failures
//!
//! Failures are never swallowed; each one ends the request.

use crate::error::Result;
use crate::model::Watch;
use serde_json::Value;
use std::future::Future;

/// Catalog operations keyed by business identifier.
///
/// Returned futures are `Send` so implementations can back axum handlers.
pub trait WatchRepository: Send + Sync {
    /// Every stored watch. An empty catalog yields an empty vec.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Watch>>> + Send;

    /// The watch whose business `id` matches exactly.
    ///
    /// # Errors
    /// `StoreError::NotFound` if absent, or a storage error.
    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Watch>> + Send;

    /// Validate `payload` and persist it as a new watch.
    ///
    /// An `id` is generated unless the payload carries one.
    ///
    /// # Errors
    /// `StoreError::Validation` for missing/invalid fields or a duplicate
    /// `sku`/`id`, or a storage error.
    fn create(&self, payload: Value) -> impl Future<Output = Result<Watch>> + Send;

    /// Merge `payload` over the stored watch and persist the result.
    ///
    /// Never creates a document.
    ///
    /// # Errors
    /// `StoreError::NotFound` if absent, `StoreError::Validation` if the
    /// merged document is invalid, or a storage error.
    fn update(&self, id: &str, payload: Value) -> impl Future<Output = Result<Watch>> + Send;

    /// Remove the watch and its embedded reviews.
    ///
    /// # Errors
    /// `StoreError::NotFound` if absent (including a second delete), or a
    /// storage error.
    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether the underlying storage is reachable.
    ///
    /// # Errors
    /// Returns `Err` if the probe itself fails.
    fn health_check(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }
}
