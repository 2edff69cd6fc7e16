//! Reconciler for the relational store.
//!
//! Bindings are rows with their own identity. An update is reconciled as
//! a diff: bindings carrying a prior identity are updated in place, bindings
//! without one are inserted, and every persisted binding whose identity is
//! absent from the new composition is deleted. The parent row is locked
//! first so concurrent updates of one operation serialize, and a stale
//! `version` is rejected before any binding is touched.

use std::collections::BTreeMap;

use crate::types::DbId;

use super::composition::{self, Composition};
use super::error::{OperationError, StorageContext};
use super::model::{
    CommandInput, CreateOperation, Operation, OperationCommand, OperationDraft, UpdateOperation,
};
use super::store::{CommandCatalog, OperationUnitOfWork, RelationalOperationStore};

pub struct RelationalOperations<C, S> {
    catalog: C,
    store: S,
}

impl<C, S> RelationalOperations<C, S>
where
    C: CommandCatalog,
    S: RelationalOperationStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    async fn compose(&self, commands: &[CommandInput]) -> Result<Composition, OperationError> {
        let catalog = self
            .catalog
            .snapshot()
            .await
            .context("load command catalog")?;
        Ok(composition::validate(&catalog, commands)?)
    }

    pub async fn create(&self, input: &CreateOperation) -> Result<Operation, OperationError> {
        let composition = self.compose(&input.commands).await?;
        let draft = OperationDraft {
            name: input.name.clone(),
            description: input.description.clone(),
            average_time: composition.total_time,
        };

        let mut uow = self.store.begin().await.context("begin unit of work")?;
        let header = uow
            .insert_operation(&draft)
            .await
            .context("insert operation")?;
        let bindings: Vec<_> = composition.bindings.iter().collect();
        let ids = uow
            .insert_bindings(header.id, &bindings)
            .await
            .context("insert operation commands")?;
        uow.commit().await.context("commit create operation")?;

        tracing::info!(
            operation_id = header.id,
            commands = ids.len(),
            average_time = header.average_time,
            "Operation created",
        );

        let commands = composition
            .bindings
            .to_operation_commands(header.id)
            .into_iter()
            .zip(ids)
            .map(|(command, id)| OperationCommand {
                id: Some(id),
                ..command
            })
            .collect();

        Ok(Operation {
            id: header.id,
            name: header.name,
            description: header.description,
            average_time: header.average_time,
            version: header.version,
            commands,
        })
    }

    pub async fn update(&self, id: DbId, input: &UpdateOperation) -> Result<(), OperationError> {
        let composition = self.compose(&input.commands).await?;
        let draft = OperationDraft {
            name: input.name.clone(),
            description: input.description.clone(),
            average_time: composition.total_time,
        };

        let mut uow = self.store.begin().await.context("begin unit of work")?;
        let current = uow
            .lock_operation(id)
            .await
            .context("lock operation")?
            .ok_or(OperationError::OperationNotFound(id))?;
        if current.version != input.version {
            return Err(OperationError::VersionConflict {
                id,
                expected: input.version,
                actual: current.version,
            });
        }

        for (binding_id, binding) in composition.bindings.existing() {
            let updated = uow
                .update_binding(id, binding_id, binding)
                .await
                .context("update operation command")?;
            if !updated {
                return Err(OperationError::BindingNotFound {
                    operation_id: id,
                    binding_id,
                });
            }
        }

        let retained = composition.bindings.retained_ids();
        let removed = uow
            .delete_bindings_except(id, &retained)
            .await
            .context("delete dropped operation commands")?;

        let new_bindings = composition.bindings.new_bindings();
        if !new_bindings.is_empty() {
            uow.insert_bindings(id, &new_bindings)
                .await
                .context("insert operation commands")?;
        }

        let header = uow
            .update_operation(id, &draft)
            .await
            .context("update operation")?;
        uow.commit().await.context("commit update operation")?;

        tracing::info!(
            operation_id = id,
            kept = retained.len(),
            inserted = new_bindings.len(),
            removed,
            version = header.version,
            "Operation bindings reconciled",
        );
        Ok(())
    }

    pub async fn get(&self, id: DbId) -> Result<Operation, OperationError> {
        self.store
            .find(id)
            .await
            .context("find operation")?
            .ok_or(OperationError::OperationNotFound(id))
    }

    pub async fn list(&self) -> Result<BTreeMap<DbId, Operation>, OperationError> {
        let operations = self.store.list().await.context("list operations")?;
        Ok(operations.into_iter().map(|op| (op.id, op)).collect())
    }

    pub async fn delete(&self, id: DbId) -> Result<(), OperationError> {
        let mut uow = self.store.begin().await.context("begin unit of work")?;
        uow.lock_operation(id)
            .await
            .context("lock operation")?
            .ok_or(OperationError::OperationNotFound(id))?;
        let removed = uow
            .delete_bindings(id)
            .await
            .context("delete operation commands")?;
        uow.delete_operation(id)
            .await
            .context("delete operation")?;
        uow.commit().await.context("commit delete operation")?;

        tracing::info!(operation_id = id, removed, "Operation deleted");
        Ok(())
    }
}
