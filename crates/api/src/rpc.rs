//! Message-call dispatcher.
//!
//! Transport-agnostic handler for request/response messages: a method name
//! plus a JSON body in, a JSON value or an [`RpcError`] out. A broker
//! consumer feeds deliveries to [`RpcRouter::handle`] and publishes the
//! result to the reply destination.

use std::fmt;

use labflow_core::error::CoreError;
use labflow_core::operation::{CreateOperation, ErrorKind, OperationError, UpdateOperation};
use labflow_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::engine::catalog;
use crate::error::AppError;
use crate::state::AppState;

/// Failure classes reported to message-call clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    InvalidArgument,
    NotFound,
    Aborted,
    Internal,
}

impl RpcCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Aborted => "aborted",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorKind> for RpcCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => Self::InvalidArgument,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Conflict => Self::Aborted,
            ErrorKind::Internal => Self::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        let classified = err.classify();
        Self::new(classified.kind.into(), classified.message)
    }
}

impl From<OperationError> for RpcError {
    fn from(err: OperationError) -> Self {
        AppError::from(err).into()
    }
}

impl From<CoreError> for RpcError {
    fn from(err: CoreError) -> Self {
        AppError::from(err).into()
    }
}

impl From<validator::ValidationErrors> for RpcError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::from(err).into()
    }
}

#[derive(Debug, Deserialize)]
struct IdRequest {
    id: DbId,
}

#[derive(Debug, Deserialize)]
struct UpdateOperationRequest {
    id: DbId,
    #[serde(flatten)]
    operation: UpdateOperation,
}

#[derive(Debug, Serialize)]
struct SyncReply {
    synced: usize,
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RpcError> {
    serde_json::from_slice(body).map_err(|e| {
        RpcError::new(
            RpcCode::InvalidArgument,
            format!("Malformed request body: {e}"),
        )
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Failed to encode reply: {e}")).into())
}

/// Dispatches `v1.*` message calls to the operation engine and the
/// command catalog.
#[derive(Clone)]
pub struct RpcRouter {
    state: AppState,
}

impl RpcRouter {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn handle(&self, method: &str, body: &[u8]) -> Result<Value, RpcError> {
        tracing::debug!(method, body_len = body.len(), "Dispatching message call");

        let result = self.dispatch(method, body).await;
        if let Err(err) = &result {
            tracing::debug!(method, code = %err.code, "Message call failed");
        }
        result
    }

    async fn dispatch(&self, method: &str, body: &[u8]) -> Result<Value, RpcError> {
        let operations = &self.state.operations;
        match method {
            "v1.createOperation" => {
                let input: CreateOperation = decode(body)?;
                input.validate()?;
                encode(&operations.create(&input).await?)
            }
            "v1.updateOperation" => {
                let request: UpdateOperationRequest = decode(body)?;
                request.operation.validate()?;
                operations.update(request.id, &request.operation).await?;
                Ok(json!({}))
            }
            "v1.getOperation" => {
                let IdRequest { id } = decode(body)?;
                encode(&operations.get(id).await?)
            }
            "v1.deleteOperation" => {
                let IdRequest { id } = decode(body)?;
                operations.delete(id).await?;
                Ok(json!({}))
            }
            "v1.getOperations" => encode(&operations.list().await?),
            "v1.getCommands" => encode(&catalog::list_commands(&self.state.pool).await?),
            "v1.syncCommands" => {
                let synced =
                    catalog::sync_commands(&self.state.pool, &self.state.config.commands_json_path)
                        .await?;
                encode(&SyncReply { synced })
            }
            other => Err(RpcError::new(
                RpcCode::InvalidArgument,
                format!("Unknown method '{other}'"),
            )),
        }
    }
}
