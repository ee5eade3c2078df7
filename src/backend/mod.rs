//! Document backend implementations.
//!
//! A backend is a flat byte store; it knows nothing about watches. The
//! [`crate::DocumentStore`] decides what the keys and values mean.

use crate::error::Result;
use std::future::Future;

pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

pub use inmemory::InMemoryBackend;
#[cfg(feature = "redis")]
pub use redis::RedisBackend;

/// Byte-oriented key/value storage the catalog is persisted in.
///
/// The store keeps documents and its unique index as plain key/value pairs
/// and relies on the conditional writes here (`set_if_absent`, `replace`,
/// `delete_if_eq`) being atomic per key. Nothing else is required of a
/// backend: no transactions, no multi-key atomicity.
///
/// Methods take `&self`; implementations share state through interior
/// mutability or an external server, and clones address the same data.
///
/// Every method fails with `StoreError::Unavailable` when the backend cannot
/// be reached. Returned futures are `Send` so the store can be driven from
/// axum handlers.
pub trait DocumentBackend: Send + Sync + Clone {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Store `value` under `key`, overwriting whatever was there.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Store value only if `key` is vacant. Returns whether it was stored.
    ///
    /// Of any number of concurrent calls on one vacant key, exactly one
    /// returns `true`.
    fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Overwrite value only if `key` is present. Returns whether it was stored.
    fn replace(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<bool>> + Send;

    /// Returns whether the key existed.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Remove `key` and return the value it held, in one atomic step.
    fn take(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Remove `key` only while it still holds `expected`.
    ///
    /// Used to release a SKU claim without touching a claim some other
    /// document has taken since.
    fn delete_if_eq(
        &self,
        key: &str,
        expected: &[u8],
    ) -> impl Future<Output = Result<bool>> + Send;

    /// All keys starting with `prefix`, in no particular order.
    fn keys_with_prefix(&self, prefix: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        async move { Ok(self.get(key).await?.is_some()) }
    }

    /// Values for `keys`, position for position; `None` where a key is absent.
    ///
    /// Falls back to one `get` per key.
    fn mget(&self, keys: &[&str]) -> impl Future<Output = Result<Vec<Option<Vec<u8>>>>> + Send {
        async move {
            let mut results = Vec::with_capacity(keys.len());
            for key in keys {
                results.push(self.get(key).await?);
            }
            Ok(results)
        }
    }

    /// Whether the backend answers. Backends without a remote side are
    /// always healthy.
    fn health_check(&self) -> impl Future<Output = Result<bool>> + Send {
        async { Ok(true) }
    }

    /// Drop every key under the store's namespace. Test and maintenance use.
    fn clear_all(&self) -> impl Future<Output = Result<()>> + Send;
}
