//! Reconciler for the document store.
//!
//! Bindings live in an embedded array with no identity of their own, so
//! an update replaces the whole document. Prior binding identities in the
//! input are accepted but carry no meaning here.

use std::collections::BTreeMap;

use crate::types::DbId;

use super::composition::{self, Composition};
use super::error::{OperationError, StorageContext};
use super::model::{CommandInput, CreateOperation, Operation, OperationDraft, UpdateOperation};
use super::store::{
    CommandCatalog, EmbeddedCommand, OperationDocument, OperationDocumentStore, ReplaceOutcome,
};

pub struct DocumentOperations<C, S> {
    catalog: C,
    store: S,
}

impl<C, S> DocumentOperations<C, S>
where
    C: CommandCatalog,
    S: OperationDocumentStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    async fn build_document(
        &self,
        name: &str,
        description: &str,
        commands: &[CommandInput],
    ) -> Result<OperationDocument, OperationError> {
        let catalog = self
            .catalog
            .snapshot()
            .await
            .context("load command catalog")?;
        let Composition {
            bindings,
            total_time,
            ..
        } = composition::validate(&catalog, commands)?;

        Ok(OperationDocument {
            draft: OperationDraft {
                name: name.to_string(),
                description: description.to_string(),
                average_time: total_time,
            },
            commands: bindings
                .iter()
                .map(|b| EmbeddedCommand {
                    command: b.command.clone(),
                    address: b.address.clone(),
                })
                .collect(),
        })
    }

    pub async fn create(&self, input: &CreateOperation) -> Result<Operation, OperationError> {
        let document = self
            .build_document(&input.name, &input.description, &input.commands)
            .await?;
        let operation = self
            .store
            .insert(&document)
            .await
            .context("insert operation document")?;

        tracing::info!(
            operation_id = operation.id,
            commands = operation.commands.len(),
            average_time = operation.average_time,
            "Operation document created",
        );
        Ok(operation)
    }

    pub async fn update(&self, id: DbId, input: &UpdateOperation) -> Result<(), OperationError> {
        let document = self
            .build_document(&input.name, &input.description, &input.commands)
            .await?;
        let outcome = self
            .store
            .replace(id, input.version, &document)
            .await
            .context("replace operation document")?;

        match outcome {
            ReplaceOutcome::Replaced(operation) => {
                tracing::info!(
                    operation_id = id,
                    commands = operation.commands.len(),
                    version = operation.version,
                    "Operation document replaced",
                );
                Ok(())
            }
            ReplaceOutcome::NotFound => Err(OperationError::OperationNotFound(id)),
            ReplaceOutcome::VersionMismatch { actual } => Err(OperationError::VersionConflict {
                id,
                expected: input.version,
                actual,
            }),
        }
    }

    pub async fn get(&self, id: DbId) -> Result<Operation, OperationError> {
        self.store
            .find(id)
            .await
            .context("find operation document")?
            .ok_or(OperationError::OperationNotFound(id))
    }

    pub async fn list(&self) -> Result<BTreeMap<DbId, Operation>, OperationError> {
        let operations = self
            .store
            .list()
            .await
            .context("list operation documents")?;
        Ok(operations.into_iter().map(|op| (op.id, op)).collect())
    }

    pub async fn delete(&self, id: DbId) -> Result<(), OperationError> {
        let deleted = self
            .store
            .delete(id)
            .await
            .context("delete operation document")?;
        if !deleted {
            return Err(OperationError::OperationNotFound(id));
        }
        tracing::info!(operation_id = id, "Operation document deleted");
        Ok(())
    }
}
