//! Mapping of store failures onto HTTP responses.
//!
//! Error bodies are plain text. Not-found responses carry a fixed message;
//! validation failures include the detail; storage failures carry only a
//! generic message and are logged.

use crate::error::StoreError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Body of every 404 from the catalog routes.
pub const NOT_FOUND_MESSAGE: &str = "Watch not found.";

/// What the failing request was doing, used to phrase the error body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    FetchAll,
    Fetch,
    Add,
    Update,
    Delete,
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Action::FetchAll => "fetching watches",
            Action::Fetch => "fetching watch",
            Action::Add => "adding watch",
            Action::Update => "updating watch",
            Action::Delete => "deleting watch",
        }
    }
}

/// API HTTP error: status code plus plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// Build Not Found (404) error
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    /// Build Bad Request (400) error with detail
    pub fn bad_request(action: Action, detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Error {}: {}", action.describe(), detail),
        )
    }

    /// Build Internal Server Error (500) without exposing the cause
    pub fn internal(action: Action) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error {}", action.describe()),
        )
    }

    /// Map a store failure for `action` to exactly one response.
    pub fn from_store(action: Action, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(),
            StoreError::Validation(detail) => Self::bad_request(action, detail),
            other => {
                error!("Error {}: {}", action.describe(), other);
                Self::internal(action)
            }
        }
    }

    /// Malformed or non-JSON request body.
    pub fn from_rejection(action: Action, rejection: JsonRejection) -> Self {
        Self::bad_request(action, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
