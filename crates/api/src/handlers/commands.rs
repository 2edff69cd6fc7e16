//! Handlers for the `/commands` resource (the command catalog).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::engine::catalog;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub synced: usize,
}

/// GET /api/v1/commands
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let commands = catalog::list_commands(&state.pool).await?;
    Ok(Json(DataResponse { data: commands }))
}

/// POST /api/v1/commands/sync
///
/// Upsert the catalog from the configured definition file.
pub async fn sync(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let synced = catalog::sync_commands(&state.pool, &state.config.commands_json_path).await?;
    Ok(Json(DataResponse {
        data: SyncResult { synced },
    }))
}
