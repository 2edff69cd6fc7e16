//! PostgreSQL implementations of the operation storage capabilities.
//!
//! [`PgOperationStore`] maps a unit of work onto one database transaction.
//! Dropping a [`PgUnitOfWork`] without committing drops the transaction,
//! which sqlx rolls back.

use std::collections::HashMap;

use async_trait::async_trait;
use labflow_core::operation::{
    CatalogSnapshot, Command, CommandCatalog, Operation, OperationDocument,
    OperationDocumentStore, OperationDraft, OperationHeader, OperationUnitOfWork, PendingBinding,
    RelationalOperationStore, ReplaceOutcome, StorageError,
};
use labflow_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::operation::WriteOperationCommand;
use crate::repositories::{
    CommandRepo, OperationCommandRepo, OperationDocumentRepo, OperationRepo,
};

fn write_row(binding: &PendingBinding) -> WriteOperationCommand<'_> {
    WriteOperationCommand {
        command: &binding.command,
        address: binding.address.as_str(),
        position: binding.position,
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Command catalog backed by the `commands` table.
#[derive(Clone)]
pub struct PgCommandCatalog {
    pool: PgPool,
}

impl PgCommandCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommandCatalog for PgCommandCatalog {
    async fn snapshot(&self) -> Result<CatalogSnapshot, StorageError> {
        let rows = CommandRepo::list(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let command = Command::from(row);
                (command.system_name.clone(), command)
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Relational
// ---------------------------------------------------------------------------

/// Operations in `operations`, bindings in `operation_commands`.
#[derive(Clone)]
pub struct PgOperationStore {
    pool: PgPool,
}

impl PgOperationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One open transaction against the relational store.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RelationalOperationStore for PgOperationStore {
    type UnitOfWork = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError> {
        let Some(row) = OperationRepo::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };
        let commands = OperationCommandRepo::list_for_operation(&self.pool, id).await?;
        Ok(Some(row.with_commands(commands)))
    }

    async fn list(&self) -> Result<Vec<Operation>, StorageError> {
        let rows = OperationRepo::list(&self.pool).await?;
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

        let mut grouped: HashMap<DbId, Vec<_>> = HashMap::new();
        for binding in OperationCommandRepo::list_for_operations(&self.pool, &ids).await? {
            grouped.entry(binding.operation_id).or_default().push(binding);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let commands = grouped.remove(&row.id).unwrap_or_default();
                row.with_commands(commands)
            })
            .collect())
    }
}

#[async_trait]
impl OperationUnitOfWork for PgUnitOfWork {
    async fn lock_operation(&mut self, id: DbId) -> Result<Option<OperationHeader>, StorageError> {
        let row = OperationRepo::lock_by_id(&mut self.tx, id).await?;
        Ok(row.map(|r| r.header()))
    }

    async fn insert_operation(
        &mut self,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError> {
        let row = OperationRepo::create(&mut self.tx, draft).await?;
        Ok(row.header())
    }

    async fn update_operation(
        &mut self,
        id: DbId,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError> {
        let row = OperationRepo::update(&mut self.tx, id, draft).await?;
        Ok(row.header())
    }

    async fn insert_bindings(
        &mut self,
        operation_id: DbId,
        bindings: &[&PendingBinding],
    ) -> Result<Vec<DbId>, StorageError> {
        let rows: Vec<WriteOperationCommand<'_>> = bindings.iter().map(|b| write_row(b)).collect();
        let ids = OperationCommandRepo::create_many(&mut self.tx, operation_id, &rows).await?;
        Ok(ids)
    }

    async fn update_binding(
        &mut self,
        operation_id: DbId,
        binding_id: DbId,
        binding: &PendingBinding,
    ) -> Result<bool, StorageError> {
        let updated =
            OperationCommandRepo::update(&mut self.tx, operation_id, binding_id, &write_row(binding))
                .await?;
        Ok(updated)
    }

    async fn delete_bindings_except(
        &mut self,
        operation_id: DbId,
        keep: &[DbId],
    ) -> Result<u64, StorageError> {
        let deleted = OperationCommandRepo::delete_except(&mut self.tx, operation_id, keep).await?;
        Ok(deleted)
    }

    async fn delete_bindings(&mut self, operation_id: DbId) -> Result<u64, StorageError> {
        let deleted = OperationCommandRepo::delete_by_operation_id(&mut self.tx, operation_id).await?;
        Ok(deleted)
    }

    async fn delete_operation(&mut self, id: DbId) -> Result<bool, StorageError> {
        let deleted = OperationRepo::delete(&mut self.tx, id).await?;
        Ok(deleted)
    }

    async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Operations in `operation_documents`, bindings embedded as JSONB.
#[derive(Clone)]
pub struct PgOperationDocumentStore {
    pool: PgPool,
}

impl PgOperationDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperationDocumentStore for PgOperationDocumentStore {
    async fn insert(&self, document: &OperationDocument) -> Result<Operation, StorageError> {
        let commands = serde_json::to_value(&document.commands)?;
        let row = OperationDocumentRepo::create(&self.pool, &document.draft, &commands).await?;
        Ok(row.into_operation()?)
    }

    async fn replace(
        &self,
        id: DbId,
        expected_version: i64,
        document: &OperationDocument,
    ) -> Result<ReplaceOutcome, StorageError> {
        let commands = serde_json::to_value(&document.commands)?;
        let replaced = OperationDocumentRepo::replace(
            &self.pool,
            id,
            expected_version,
            &document.draft,
            &commands,
        )
        .await?;

        if let Some(row) = replaced {
            return Ok(ReplaceOutcome::Replaced(row.into_operation()?));
        }
        tracing::debug!(
            operation_id = id,
            expected_version,
            "Conditional document replace matched no row"
        );
        Ok(match OperationDocumentRepo::current_version(&self.pool, id).await? {
            Some(actual) => ReplaceOutcome::VersionMismatch { actual },
            None => ReplaceOutcome::NotFound,
        })
    }

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError> {
        match OperationDocumentRepo::find_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(row.into_operation()?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Operation>, StorageError> {
        let rows = OperationDocumentRepo::list(&self.pool).await?;
        let operations = rows
            .into_iter()
            .map(|row| row.into_operation())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(operations)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StorageError> {
        let deleted = OperationDocumentRepo::delete(&self.pool, id).await?;
        Ok(deleted)
    }
}
