//! Operation composition and reconciliation.
//!
//! A request flows through the catalog snapshot, the container allocation
//! validator ([`composition::validate`]), the binding set builder, and then
//! one of the two reconcilers: [`relational::RelationalOperations`] for
//! independently keyed binding rows, or [`document::DocumentOperations`] for
//! bindings embedded in a single document.

pub mod bindings;
pub mod composition;
pub mod document;
pub mod error;
pub mod model;
pub mod relational;
pub mod store;

#[cfg(test)]
mod memory;

pub use bindings::{BindingIdentity, BindingSet, PendingBinding};
pub use composition::{validate, CatalogSnapshot, Composition, ContainerPlan};
pub use document::DocumentOperations;
pub use error::{CompositionError, ErrorKind, OperationError, StorageError};
pub use model::{
    Address, Command, CommandInput, Container, CreateOperation, Operation, OperationCommand,
    OperationDraft, OperationHeader, ReagentType, UpdateOperation,
};
pub use relational::RelationalOperations;
pub use store::{
    CommandCatalog, EmbeddedCommand, OperationDocument, OperationDocumentStore,
    OperationUnitOfWork, RelationalOperationStore, ReplaceOutcome,
};
