//! Redis document backend implementation.

use super::DocumentBackend;
use crate::error::{Result, StoreError};
use crate::key::NAMESPACE;
use deadpool_redis::redis::{cmd, AsyncCommands, Script};
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 500;

/// Compare-and-delete: drop KEYS[1] only while it still holds ARGV[1].
const DELETE_IF_EQ_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Escape glob metacharacters so `prefix` matches literally in SCAN MATCH.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Redis backend with connection pooling.
///
/// Conditional writes map onto single Redis commands (`SETNX`, `SET XX`) or
/// a Lua script (compare-and-delete), so each is atomic on the server.
///
/// # Example
///
/// ```no_run
/// # use watch_store::backend::{DocumentBackend, RedisBackend};
/// # async fn example() -> watch_store::Result<()> {
/// let backend = RedisBackend::from_connection_string("redis://localhost:6379/0", 16).await?;
/// backend.set("watch:doc:1", b"bytes".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create from connection string directly.
    ///
    /// The pool connects lazily; call [`DocumentBackend::health_check`] to
    /// verify the server is reachable.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn from_connection_string(conn_str: &str, pool_size: u32) -> Result<Self> {
        let mut cfg = PoolConfig::from_url(conn_str);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(pool_size as usize));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Config(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "✓ Redis backend initialized from connection string (pool size: {})",
            pool_size
        );
        Ok(RedisBackend { pool })
    }

    async fn connection(&self) -> Result<Connection> {
        self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            StoreError::Unavailable(format!("Failed to get Redis connection: {}", e))
        })
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.connection().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(|e| StoreError::Unavailable(format!("Redis SCAN failed: {}", e)))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

impl DocumentBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
            StoreError::Unavailable(format!("Redis GET failed for key {}: {}", key, e))
        })?;

        debug!(
            "✓ Redis GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;

        conn.set::<_, _, ()>(key, value).await.map_err(|e| {
            StoreError::Unavailable(format!("Redis SET failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis SET {}", key);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut conn = self.connection().await?;

        let stored: bool = conn.set_nx(key, value).await.map_err(|e| {
            StoreError::Unavailable(format!("Redis SETNX failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis SETNX {} -> {}", key, stored);
        Ok(stored)
    }

    async fn replace(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut conn = self.connection().await?;

        // Nil reply when the key is absent
        let reply: Option<String> = cmd("SET")
            .arg(key)
            .arg(value)
            .arg("XX")
            .query_async(&mut *conn)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Redis SET XX failed for key {}: {}", key, e))
            })?;

        let stored = reply.is_some();
        debug!("✓ Redis SET XX {} -> {}", key, stored);
        Ok(stored)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;

        let removed: i64 = conn.del(key).await.map_err(|e| {
            StoreError::Unavailable(format!("Redis DEL failed for key {}: {}", key, e))
        })?;

        debug!("✓ Redis DELETE {} -> {}", key, removed > 0);
        Ok(removed > 0)
    }

    async fn take(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = cmd("GETDEL")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Redis GETDEL failed for key {}: {}", key, e))
            })?;

        debug!("✓ Redis GETDEL {} -> {}", key, value.is_some());
        Ok(value)
    }

    async fn delete_if_eq(&self, key: &str, expected: &[u8]) -> Result<bool> {
        let mut conn = self.connection().await?;

        let removed: i64 = Script::new(DELETE_IF_EQ_SCRIPT)
            .key(key)
            .arg(expected)
            .invoke_async(&mut *conn)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!(
                    "Redis compare-and-delete failed for key {}: {}",
                    key, e
                ))
            })?;

        debug!("✓ Redis DELETE-IF-EQ {} -> {}", key, removed > 0);
        Ok(removed > 0)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = self.scan(&format!("{}*", glob_escape(prefix))).await?;
        debug!("✓ Redis SCAN {}* -> {} keys", prefix, keys.len());
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;

        let exists: bool = conn.exists(key).await.map_err(|e| {
            StoreError::Unavailable(format!("Redis EXISTS failed for key {}: {}", key, e))
        })?;

        Ok(exists)
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection().await?;

        // Explicit MGET: a one-element GET would come back as a scalar
        let values: Vec<Option<Vec<u8>>> = cmd("MGET")
            .arg(keys)
            .query_async(&mut *conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis MGET failed: {}", e)))?;

        debug!("✓ Redis MGET {} keys", keys.len());
        Ok(values)
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {}", e)))?;

        Ok(pong.contains("PONG"))
    }

    async fn clear_all(&self) -> Result<()> {
        let keys = self.scan(&format!("{}:*", glob_escape(NAMESPACE))).await?;
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.connection().await?;
        conn.del::<_, ()>(&keys)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis DEL (bulk) failed: {}", e)))?;

        warn!("⚠ Redis CLEAR_ALL removed {} keys", keys.len());
        Ok(())
    }
}
