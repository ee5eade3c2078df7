//! Catalog endpoints. Each handler makes one repository call and maps the
//! outcome; none of them inspect the payload.

use super::error::{Action, ApiError};
use super::AppState;
use crate::model::Watch;
use crate::repository::WatchRepository;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check<R: WatchRepository>(State(state): State<AppState<R>>) -> Response {
    match state.repo.health_check().await {
        Ok(true) => Json(json!({
            "status": "healthy",
            "service": "watch-store"
        }))
        .into_response(),
        Ok(false) => unavailable(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            unavailable()
        }
    }
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "unavailable",
            "service": "watch-store"
        })),
    )
        .into_response()
}

/// GET /watches
pub async fn list_watches<R: WatchRepository>(
    State(state): State<AppState<R>>,
) -> ApiResult<Json<Vec<Watch>>> {
    let watches = state
        .repo
        .list_all()
        .await
        .map_err(|e| ApiError::from_store(Action::FetchAll, e))?;
    Ok(Json(watches))
}

/// GET /watches/{id}
pub async fn get_watch<R: WatchRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Watch>> {
    let watch = state
        .repo
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::from_store(Action::Fetch, e))?;
    Ok(Json(watch))
}

/// POST /watches
pub async fn create_watch<R: WatchRepository>(
    State(state): State<AppState<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Watch>)> {
    let Json(payload) = payload.map_err(|e| ApiError::from_rejection(Action::Add, e))?;

    let watch = state
        .repo
        .create(payload)
        .await
        .map_err(|e| ApiError::from_store(Action::Add, e))?;
    Ok((StatusCode::CREATED, Json(watch)))
}

/// PUT /watches/{id}
pub async fn update_watch<R: WatchRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Watch>> {
    let Json(payload) = payload.map_err(|e| ApiError::from_rejection(Action::Update, e))?;

    let watch = state
        .repo
        .update(&id, payload)
        .await
        .map_err(|e| ApiError::from_store(Action::Update, e))?;
    Ok(Json(watch))
}

/// DELETE /watches/{id}
pub async fn delete_watch<R: WatchRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .repo
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(Action::Delete, e))?;
    Ok(StatusCode::NO_CONTENT)
}
