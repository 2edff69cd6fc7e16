pub mod commands;
pub mod health;
pub mod operations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /operations              list, create
/// /operations/{id}         get, update, delete
///
/// /commands                list
/// /commands/sync           sync from definition file (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/operations", operations::router())
        .nest("/commands", commands::router())
}
