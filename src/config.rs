//! Process configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_HOST` | `127.0.0.1` |
//! | `SERVER_PORT` | `5000` |
//! | `STORE_BACKEND` | `memory` (`memory` or `redis`) |
//! | `REDIS_URL` | `redis://localhost:6379/0` |
//! | `REDIS_POOL_SIZE` | `16` |
//! | `LOG_LEVEL` | `info` |
//!
//! The binary loads a `.env` file first, so any of these can live there.

use crate::error::{Result, StoreError};
use log::LevelFilter;
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";
pub const DEFAULT_REDIS_POOL_SIZE: u32 = 16;

/// Which backend the catalog is stored in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Redis { url: String, pool_size: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backend: BackendKind::Memory,
            log_level: LevelFilter::Info,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| StoreError::Config(format!("{}={:?}: {}", name, value, e))),
        None => Ok(default),
    }
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    /// `StoreError::Config` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    ///
    /// # Errors
    /// `StoreError::Config` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_var("SERVER_PORT", lookup("SERVER_PORT"), DEFAULT_PORT)?;
        let log_level = parse_var("LOG_LEVEL", lookup("LOG_LEVEL"), LevelFilter::Info)?;

        let backend = match lookup("STORE_BACKEND")
            .map(|kind| kind.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("memory") => BackendKind::Memory,
            Some("redis") => BackendKind::Redis {
                url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
                pool_size: parse_var(
                    "REDIS_POOL_SIZE",
                    lookup("REDIS_POOL_SIZE"),
                    DEFAULT_REDIS_POOL_SIZE,
                )?,
            },
            Some(other) => {
                return Err(StoreError::Config(format!(
                    "STORE_BACKEND={:?}: expected `memory` or `redis`",
                    other
                )))
            }
        };

        Ok(Config {
            host,
            port,
            backend,
            log_level,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
