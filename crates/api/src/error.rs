use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use labflow_core::error::CoreError;
use labflow_core::operation::{CompositionError, ErrorKind, OperationError};
use serde_json::json;

/// Application-level error type for HTTP handlers and the RPC dispatcher.
///
/// Wraps [`CoreError`] and [`OperationError`] for domain errors and adds
/// transport-level variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A generic domain error from `labflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A composition or reconciliation failure.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// Request body failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// How an error is reported to a caller: its class, a stable machine-readable
/// code, and a message safe to expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: ErrorKind,
    pub code: &'static str,
    pub message: String,
}

impl Classified {
    fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(ErrorKind::Internal, "INTERNAL_ERROR", INTERNAL_MESSAGE)
    }
}

impl AppError {
    /// Classify the error. Internal causes are logged here and replaced by a
    /// generic message.
    pub fn classify(&self) -> Classified {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => Classified::new(
                    ErrorKind::NotFound,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    Classified::new(ErrorKind::InvalidArgument, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => {
                    Classified::new(ErrorKind::Conflict, "CONFLICT", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    Classified::internal()
                }
            },

            // --- Operation errors ---
            AppError::Operation(err) => classify_operation_error(err),

            // --- Request validation ---
            AppError::Validation(errors) => Classified::new(
                ErrorKind::InvalidArgument,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Transport-specific errors ---
            AppError::BadRequest(msg) => {
                Classified::new(ErrorKind::InvalidArgument, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Classified::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Classified {
            kind,
            code,
            message,
        } = self.classify();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status_for(kind), axum::Json(body)).into_response()
    }
}

/// HTTP status for an error class.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn classify_operation_error(err: &OperationError) -> Classified {
    let code = match err {
        OperationError::Composition(CompositionError::CommandNotFound { .. }) => {
            "COMMAND_NOT_FOUND"
        }
        OperationError::Composition(CompositionError::DuplicateAddress { .. }) => {
            "DUPLICATE_ADDRESS"
        }
        OperationError::Composition(CompositionError::VolumeExceeded { .. }) => "VOLUME_EXCEEDED",
        OperationError::Composition(CompositionError::DuplicateBinding { .. }) => {
            "DUPLICATE_BINDING"
        }
        OperationError::Composition(CompositionError::DurationOverflow { .. }) => {
            "DURATION_OVERFLOW"
        }
        OperationError::Composition(CompositionError::TooManyCommands { .. }) => {
            "TOO_MANY_COMMANDS"
        }
        OperationError::OperationNotFound(_) => "NOT_FOUND",
        OperationError::BindingNotFound { .. } => "BINDING_NOT_FOUND",
        OperationError::VersionConflict { .. } => "VERSION_CONFLICT",
        OperationError::Storage { .. } => {
            tracing::error!(error = %err, "Operation storage failure");
            return Classified::internal();
        }
    };
    Classified::new(err.kind(), code, err.to_string())
}

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to not-found.
/// - Unique constraint violations (constraint name starting with `uq_`) map to conflict.
/// - Everything else is internal with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => {
            Classified::new(ErrorKind::NotFound, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return Classified::new(
                        ErrorKind::Conflict,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            Classified::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            Classified::internal()
        }
    }
}
