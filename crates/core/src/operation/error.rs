//! Error taxonomy for operation composition and reconciliation.

use crate::types::DbId;

use super::model::{Address, ReagentType};

/// Failure from an underlying store. The engine does not inspect it.
pub type StorageError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A composition was rejected. Deterministic for a given input and catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Command '{system_name}' at position {position} is not in the catalog")]
    CommandNotFound { system_name: String, position: usize },

    #[error("Address {address} already holds reagent '{existing}', cannot place '{requested}'")]
    DuplicateAddress {
        address: Address,
        existing: ReagentType,
        requested: ReagentType,
    },

    #[error("Container at {address} would hold {volume}, exceeding capacity {capacity}")]
    VolumeExceeded {
        address: Address,
        volume: i64,
        capacity: i64,
    },

    #[error("Binding {binding_id} appears more than once in the composition")]
    DuplicateBinding { binding_id: DbId },

    #[error("Total duration overflows at position {position}")]
    DurationOverflow { position: usize },

    #[error("Composition has {count} commands, at most {limit} are allowed")]
    TooManyCommands { count: usize, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("Operation with id {0} not found")]
    OperationNotFound(DbId),

    #[error("Binding {binding_id} does not belong to operation {operation_id}")]
    BindingNotFound { operation_id: DbId, binding_id: DbId },

    #[error("Operation {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict { id: DbId, expected: i64, actual: i64 },

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },
}

/// Transport-neutral classification shared by the HTTP and message-call adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Internal,
}

impl OperationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Composition(CompositionError::CommandNotFound { .. }) => ErrorKind::NotFound,
            Self::Composition(_) => ErrorKind::InvalidArgument,
            Self::OperationNotFound(_) | Self::BindingNotFound { .. } => ErrorKind::NotFound,
            Self::VersionConflict { .. } => ErrorKind::Conflict,
            Self::Storage { .. } => ErrorKind::Internal,
        }
    }
}

/// Attach a call-site label to a storage failure.
pub(crate) trait StorageContext<T> {
    fn context(self, context: &'static str) -> Result<T, OperationError>;
}

impl<T> StorageContext<T> for Result<T, StorageError> {
    fn context(self, context: &'static str) -> Result<T, OperationError> {
        self.map_err(|source| OperationError::Storage { context, source })
    }
}
