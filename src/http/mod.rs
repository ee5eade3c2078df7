//! HTTP route layer (axum).
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/watches` | 200 JSON array |
//! | GET | `/watches/{id}` | 200 JSON object |
//! | POST | `/watches` | 201 JSON object |
//! | PUT | `/watches/{id}` | 200 JSON object |
//! | DELETE | `/watches/{id}` | 204 empty |
//! | GET | `/health` | 200 / 503 JSON |
//!
//! The repository is injected as router state, so the same routes serve a
//! Redis-backed store in production and an in-memory one in tests.

mod error;
mod routes;

pub use error::{Action, ApiError, NOT_FOUND_MESSAGE};

use crate::repository::WatchRepository;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Shared state handed to every handler.
pub struct AppState<R> {
    pub repo: Arc<R>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        AppState {
            repo: Arc::clone(&self.repo),
        }
    }
}

/// Build the catalog router around `repo`.
pub fn router<R: WatchRepository + 'static>(repo: Arc<R>) -> Router {
    Router::new()
        .route("/health", get(routes::health_check::<R>))
        .route(
            "/watches",
            get(routes::list_watches::<R>).post(routes::create_watch::<R>),
        )
        .route(
            "/watches/{id}",
            get(routes::get_watch::<R>)
                .put(routes::update_watch::<R>)
                .delete(routes::delete_watch::<R>),
        )
        .with_state(AppState { repo })
}
