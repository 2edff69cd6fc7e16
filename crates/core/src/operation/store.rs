//! Storage capabilities required by the reconcilers.
//!
//! The relational variant works through an explicit unit of work: every
//! mutation is a method on the value returned by
//! [`RelationalOperationStore::begin`], and nothing is visible to other
//! readers until [`OperationUnitOfWork::commit`] succeeds. Dropping an
//! uncommitted unit of work must discard all of its writes.

use async_trait::async_trait;

use crate::types::DbId;

use super::bindings::PendingBinding;
use super::composition::CatalogSnapshot;
use super::error::StorageError;
use super::model::{Address, Command, Operation, OperationDraft, OperationHeader};

/// Read-only access to the command catalog.
#[async_trait]
pub trait CommandCatalog: Send + Sync {
    /// Bulk read of every command keyed by system name.
    async fn snapshot(&self) -> Result<CatalogSnapshot, StorageError>;
}

/// Relational store: operation rows plus independently keyed binding rows.
#[async_trait]
pub trait RelationalOperationStore: Send + Sync {
    type UnitOfWork: OperationUnitOfWork;

    async fn begin(&self) -> Result<Self::UnitOfWork, StorageError>;

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError>;

    async fn list(&self) -> Result<Vec<Operation>, StorageError>;
}

/// Mutations available inside one atomic unit of work.
#[async_trait]
pub trait OperationUnitOfWork: Send {
    /// Read the parent row and hold it against concurrent writers until
    /// the unit of work ends.
    async fn lock_operation(&mut self, id: DbId) -> Result<Option<OperationHeader>, StorageError>;

    async fn insert_operation(
        &mut self,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError>;

    /// Overwrite scalar fields and bump the version.
    async fn update_operation(
        &mut self,
        id: DbId,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError>;

    /// Insert bindings for `operation_id`, returning their identities in order.
    async fn insert_bindings(
        &mut self,
        operation_id: DbId,
        bindings: &[&PendingBinding],
    ) -> Result<Vec<DbId>, StorageError>;

    /// Update a binding in place. Returns `false` when no binding with
    /// `binding_id` belongs to `operation_id`.
    async fn update_binding(
        &mut self,
        operation_id: DbId,
        binding_id: DbId,
        binding: &PendingBinding,
    ) -> Result<bool, StorageError>;

    /// Delete every binding of `operation_id` whose identity is not in `keep`.
    async fn delete_bindings_except(
        &mut self,
        operation_id: DbId,
        keep: &[DbId],
    ) -> Result<u64, StorageError>;

    async fn delete_bindings(&mut self, operation_id: DbId) -> Result<u64, StorageError>;

    async fn delete_operation(&mut self, id: DbId) -> Result<bool, StorageError>;

    async fn commit(self) -> Result<(), StorageError>;
}

/// A binding as embedded inside an operation document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmbeddedCommand {
    pub command: Command,
    pub address: Address,
}

/// Full content of an operation document, minus its identity and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDocument {
    pub draft: OperationDraft,
    pub commands: Vec<EmbeddedCommand>,
}

/// Outcome of a conditional whole-document replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced(Operation),
    NotFound,
    VersionMismatch { actual: i64 },
}

/// Document store: bindings embedded in the parent document. Each call is
/// atomic on its own document.
#[async_trait]
pub trait OperationDocumentStore: Send + Sync {
    /// Insert a new document; the store assigns the identity.
    async fn insert(&self, document: &OperationDocument) -> Result<Operation, StorageError>;

    /// Replace every field of document `id` if its version is `expected_version`.
    async fn replace(
        &self,
        id: DbId,
        expected_version: i64,
        document: &OperationDocument,
    ) -> Result<ReplaceOutcome, StorageError>;

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError>;

    async fn list(&self) -> Result<Vec<Operation>, StorageError>;

    async fn delete(&self, id: DbId) -> Result<bool, StorageError>;
}
