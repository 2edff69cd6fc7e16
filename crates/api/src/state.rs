use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::OperationBackend;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: labflow_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Reconciler selected by `config.operation_store`.
    pub operations: Arc<OperationBackend>,
}

impl AppState {
    pub fn new(pool: labflow_db::DbPool, config: ServerConfig) -> Self {
        let operations = Arc::new(OperationBackend::new(config.operation_store, &pool));
        Self {
            pool,
            config: Arc::new(config),
            operations,
        }
    }
}
