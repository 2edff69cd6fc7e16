//! Route definitions for the command catalog.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::commands;
use crate::state::AppState;

/// Routes mounted at `/commands`.
///
/// ```text
/// GET    /        -> list
/// POST   /sync    -> sync
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(commands::list))
        .route("/sync", post(commands::sync))
}
