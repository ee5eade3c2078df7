//! # watch-store
//!
//! Product catalog service for a watch store: a typed document model for
//! watches and their embedded reviews, a store adapter that persists those
//! documents on a pluggable key-value backend, and an axum router exposing
//! the catalog over REST.
//!
//! ## Layers
//!
//! - **Model:** [`model::Watch`] and [`model::Review`], plus the draft types
//!   that incoming JSON is parsed into before validation.
//! - **Backend:** [`DocumentBackend`] stores opaque bytes. In-memory (DashMap)
//!   is always available; Redis is behind the `redis` feature.
//! - **Store:** [`DocumentStore`] implements [`WatchRepository`] on top of any
//!   backend, keyed by the business `id` and enforcing `sku` uniqueness.
//! - **HTTP:** [`http::router`] wires the five catalog endpoints to any
//!   repository.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use watch_store::{backend::InMemoryBackend, http, DocumentStore};
//!
//! let store = DocumentStore::new(InMemoryBackend::new());
//! let app = http::router(Arc::new(store));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod capability;
pub mod claim;
pub mod config;
pub mod error;
pub mod http;
pub mod key;
pub mod model;
pub mod observability;
pub mod repository;
pub mod serialization;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use backend::DocumentBackend;
pub use capability::{Clock, IdGenerator, SystemClock, UuidGenerator};
pub use claim::{SkuClaim, DEFAULT_CLAIM_GRACE};
pub use config::Config;
pub use error::{Result, StoreError};
pub use model::{Gender, Review, Watch};
pub use repository::WatchRepository;
pub use store::DocumentStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
