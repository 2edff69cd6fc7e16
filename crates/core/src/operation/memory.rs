//! In-memory stores for exercising the reconcilers.
//!
//! A unit of work stages a full copy of the state and publishes it on
//! commit; dropping it discards the copy.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::types::DbId;

use super::bindings::PendingBinding;
use super::composition::CatalogSnapshot;
use super::error::StorageError;
use super::model::{
    Address, Command, Operation, OperationCommand, OperationDraft, OperationHeader, ReagentType,
};
use super::store::{
    CommandCatalog, EmbeddedCommand, OperationDocument, OperationDocumentStore,
    OperationUnitOfWork, RelationalOperationStore, ReplaceOutcome,
};

fn command(id: DbId, system_name: &str, reagent: &str, time: i64, volume: i64, cap: i64) -> Command {
    Command {
        id,
        name: system_name.to_uppercase(),
        system_name: system_name.to_string(),
        reagent: ReagentType::from(reagent),
        average_time: time,
        volume_waste: 1,
        volume_drive_fluid: 2,
        volume_container: volume,
        max_volume: cap,
        default_address: Address::from("A1"),
    }
}

/// `cmd_a`/`cmd_b` share reagent R1 with capacity 8 (volumes 5 and 4);
/// `cmd_c` uses R2, `cmd_d` uses R3.
pub fn sample_catalog() -> CatalogSnapshot {
    [
        command(1, "cmd_a", "R1", 10, 5, 8),
        command(2, "cmd_b", "R1", 7, 4, 8),
        command(3, "cmd_c", "R2", 3, 1, 8),
        command(4, "cmd_d", "R3", 6, 2, 10),
    ]
    .into_iter()
    .map(|c| (c.system_name.clone(), c))
    .collect()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryCatalog {
    commands: Arc<Mutex<CatalogSnapshot>>,
    failing: Arc<AtomicBool>,
}

impl MemoryCatalog {
    pub fn new(commands: CatalogSnapshot) -> Self {
        Self {
            commands: Arc::new(Mutex::new(commands)),
            failing: Arc::default(),
        }
    }

    pub fn set_average_time(&self, system_name: &str, average_time: i64) {
        let mut commands = self.commands.lock().unwrap();
        commands.get_mut(system_name).unwrap().average_time = average_time;
    }

    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommandCatalog for MemoryCatalog {
    async fn snapshot(&self) -> Result<CatalogSnapshot, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("catalog unavailable".into());
        }
        Ok(self.commands.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Relational
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct BindingRow {
    operation_id: DbId,
    command: Command,
    address: Address,
    position: i32,
}

#[derive(Debug, Clone, Default)]
struct RelationalState {
    operations: BTreeMap<DbId, OperationHeader>,
    bindings: BTreeMap<DbId, BindingRow>,
    next_operation_id: DbId,
    next_binding_id: DbId,
}

impl RelationalState {
    fn assemble(&self, header: &OperationHeader) -> Operation {
        let mut rows: Vec<(DbId, &BindingRow)> = self
            .bindings
            .iter()
            .filter(|(_, row)| row.operation_id == header.id)
            .map(|(id, row)| (*id, row))
            .collect();
        rows.sort_by_key(|(id, row)| (row.position, *id));

        Operation {
            id: header.id,
            name: header.name.clone(),
            description: header.description.clone(),
            average_time: header.average_time,
            version: header.version,
            commands: rows
                .into_iter()
                .map(|(id, row)| OperationCommand {
                    id: Some(id),
                    operation_id: row.operation_id,
                    command: row.command.clone(),
                    address: row.address.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryRelationalStore {
    state: Arc<Mutex<RelationalState>>,
    fail_commit: Arc<AtomicBool>,
}

impl MemoryRelationalStore {
    pub fn operation_count(&self) -> usize {
        self.state.lock().unwrap().operations.len()
    }

    pub fn binding_count(&self) -> usize {
        self.state.lock().unwrap().bindings.len()
    }

    pub fn fail_next_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }
}

pub struct MemoryUnitOfWork {
    shared: Arc<Mutex<RelationalState>>,
    staged: RelationalState,
    fail_commit: Arc<AtomicBool>,
}

#[async_trait]
impl RelationalOperationStore for MemoryRelationalStore {
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, StorageError> {
        Ok(MemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            staged: self.state.lock().unwrap().clone(),
            fail_commit: Arc::clone(&self.fail_commit),
        })
    }

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.operations.get(&id).map(|h| state.assemble(h)))
    }

    async fn list(&self) -> Result<Vec<Operation>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.operations.values().map(|h| state.assemble(h)).collect())
    }
}

#[async_trait]
impl OperationUnitOfWork for MemoryUnitOfWork {
    async fn lock_operation(&mut self, id: DbId) -> Result<Option<OperationHeader>, StorageError> {
        Ok(self.staged.operations.get(&id).cloned())
    }

    async fn insert_operation(
        &mut self,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError> {
        self.staged.next_operation_id += 1;
        let header = OperationHeader {
            id: self.staged.next_operation_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            average_time: draft.average_time,
            version: 1,
        };
        self.staged.operations.insert(header.id, header.clone());
        Ok(header)
    }

    async fn update_operation(
        &mut self,
        id: DbId,
        draft: &OperationDraft,
    ) -> Result<OperationHeader, StorageError> {
        let header = self
            .staged
            .operations
            .get_mut(&id)
            .ok_or("operation row vanished")?;
        header.name = draft.name.clone();
        header.description = draft.description.clone();
        header.average_time = draft.average_time;
        header.version += 1;
        Ok(header.clone())
    }

    async fn insert_bindings(
        &mut self,
        operation_id: DbId,
        bindings: &[&PendingBinding],
    ) -> Result<Vec<DbId>, StorageError> {
        let mut ids = Vec::with_capacity(bindings.len());
        for binding in bindings {
            self.staged.next_binding_id += 1;
            let id = self.staged.next_binding_id;
            self.staged.bindings.insert(
                id,
                BindingRow {
                    operation_id,
                    command: binding.command.clone(),
                    address: binding.address.clone(),
                    position: binding.position,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    async fn update_binding(
        &mut self,
        operation_id: DbId,
        binding_id: DbId,
        binding: &PendingBinding,
    ) -> Result<bool, StorageError> {
        match self.staged.bindings.get_mut(&binding_id) {
            Some(row) if row.operation_id == operation_id => {
                row.command = binding.command.clone();
                row.address = binding.address.clone();
                row.position = binding.position;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_bindings_except(
        &mut self,
        operation_id: DbId,
        keep: &[DbId],
    ) -> Result<u64, StorageError> {
        let before = self.staged.bindings.len();
        self.staged
            .bindings
            .retain(|id, row| row.operation_id != operation_id || keep.contains(id));
        Ok((before - self.staged.bindings.len()) as u64)
    }

    async fn delete_bindings(&mut self, operation_id: DbId) -> Result<u64, StorageError> {
        self.delete_bindings_except(operation_id, &[]).await
    }

    async fn delete_operation(&mut self, id: DbId) -> Result<bool, StorageError> {
        Ok(self.staged.operations.remove(&id).is_some())
    }

    async fn commit(self) -> Result<(), StorageError> {
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err("commit refused".into());
        }
        *self.shared.lock().unwrap() = self.staged;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredDocument {
    draft: OperationDraft,
    commands: Vec<EmbeddedCommand>,
    version: i64,
}

impl StoredDocument {
    fn to_operation(&self, id: DbId) -> Operation {
        Operation {
            id,
            name: self.draft.name.clone(),
            description: self.draft.description.clone(),
            average_time: self.draft.average_time,
            version: self.version,
            commands: self
                .commands
                .iter()
                .map(|c| OperationCommand {
                    id: None,
                    operation_id: id,
                    command: c.command.clone(),
                    address: c.address.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Default)]
struct DocumentState {
    documents: BTreeMap<DbId, StoredDocument>,
    next_id: DbId,
}

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<DocumentState>>,
}

impl MemoryDocumentStore {
    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }
}

#[async_trait]
impl OperationDocumentStore for MemoryDocumentStore {
    async fn insert(&self, document: &OperationDocument) -> Result<Operation, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let stored = StoredDocument {
            draft: document.draft.clone(),
            commands: document.commands.clone(),
            version: 1,
        };
        let operation = stored.to_operation(id);
        state.documents.insert(id, stored);
        Ok(operation)
    }

    async fn replace(
        &self,
        id: DbId,
        expected_version: i64,
        document: &OperationDocument,
    ) -> Result<ReplaceOutcome, StorageError> {
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.documents.get_mut(&id) else {
            return Ok(ReplaceOutcome::NotFound);
        };
        if stored.version != expected_version {
            return Ok(ReplaceOutcome::VersionMismatch {
                actual: stored.version,
            });
        }
        stored.draft = document.draft.clone();
        stored.commands = document.commands.clone();
        stored.version += 1;
        Ok(ReplaceOutcome::Replaced(stored.to_operation(id)))
    }

    async fn find(&self, id: DbId) -> Result<Option<Operation>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state.documents.get(&id).map(|d| d.to_operation(id)))
    }

    async fn list(&self) -> Result<Vec<Operation>, StorageError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .documents
            .iter()
            .map(|(id, d)| d.to_operation(*id))
            .collect())
    }

    async fn delete(&self, id: DbId) -> Result<bool, StorageError> {
        Ok(self.state.lock().unwrap().documents.remove(&id).is_some())
    }
}
