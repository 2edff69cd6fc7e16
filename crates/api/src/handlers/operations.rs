//! Handlers for the `/operations` resource.
//!
//! Thin adapters over [`crate::engine::OperationBackend`]: bodies are checked
//! with `validator` before reaching the engine, and engine errors are mapped
//! by [`AppError`](crate::error::AppError).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use labflow_core::operation::{CreateOperation, UpdateOperation};
use labflow_core::types::DbId;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/operations
///
/// All operations, as an object keyed by operation id.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let operations = state.operations.list().await?;
    Ok(Json(DataResponse { data: operations }))
}

/// POST /api/v1/operations
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateOperation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let operation = state.operations.create(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: operation })))
}

/// GET /api/v1/operations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let operation = state.operations.get(id).await?;
    Ok(Json(DataResponse { data: operation }))
}

/// PUT /api/v1/operations/{id}
///
/// Replace name, description and composition. `version` must match the
/// stored version.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOperation>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.operations.update(id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/operations/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.operations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
