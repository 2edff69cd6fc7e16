//! Route definitions for operations.

use axum::routing::get;
use axum::Router;

use crate::handlers::operations;
use crate::state::AppState;

/// Routes mounted at `/operations`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(operations::list).post(operations::create))
        .route(
            "/{id}",
            get(operations::get_by_id)
                .put(operations::update)
                .delete(operations::delete),
        )
}
