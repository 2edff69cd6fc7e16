use std::collections::BTreeMap;

use labflow_core::operation::{
    CreateOperation, DocumentOperations, Operation, OperationError, RelationalOperations,
    UpdateOperation,
};
use labflow_core::types::DbId;
use labflow_db::stores::{PgCommandCatalog, PgOperationDocumentStore, PgOperationStore};
use labflow_db::DbPool;

use crate::config::OperationStoreKind;

/// The reconciler serving operation requests.
pub enum OperationBackend {
    Relational(RelationalOperations<PgCommandCatalog, PgOperationStore>),
    Document(DocumentOperations<PgCommandCatalog, PgOperationDocumentStore>),
}

impl OperationBackend {
    pub fn new(kind: OperationStoreKind, pool: &DbPool) -> Self {
        let catalog = PgCommandCatalog::new(pool.clone());
        match kind {
            OperationStoreKind::Relational => Self::Relational(RelationalOperations::new(
                catalog,
                PgOperationStore::new(pool.clone()),
            )),
            OperationStoreKind::Document => Self::Document(DocumentOperations::new(
                catalog,
                PgOperationDocumentStore::new(pool.clone()),
            )),
        }
    }

    pub fn kind(&self) -> OperationStoreKind {
        match self {
            Self::Relational(_) => OperationStoreKind::Relational,
            Self::Document(_) => OperationStoreKind::Document,
        }
    }

    pub async fn create(&self, input: &CreateOperation) -> Result<Operation, OperationError> {
        match self {
            Self::Relational(ops) => ops.create(input).await,
            Self::Document(ops) => ops.create(input).await,
        }
    }

    pub async fn update(&self, id: DbId, input: &UpdateOperation) -> Result<(), OperationError> {
        match self {
            Self::Relational(ops) => ops.update(id, input).await,
            Self::Document(ops) => ops.update(id, input).await,
        }
    }

    pub async fn get(&self, id: DbId) -> Result<Operation, OperationError> {
        match self {
            Self::Relational(ops) => ops.get(id).await,
            Self::Document(ops) => ops.get(id).await,
        }
    }

    pub async fn list(&self) -> Result<BTreeMap<DbId, Operation>, OperationError> {
        match self {
            Self::Relational(ops) => ops.list().await,
            Self::Document(ops) => ops.list().await,
        }
    }

    pub async fn delete(&self, id: DbId) -> Result<(), OperationError> {
        match self {
            Self::Relational(ops) => ops.delete(id).await,
            Self::Document(ops) => ops.delete(id).await,
        }
    }
}
