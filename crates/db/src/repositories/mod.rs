//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Reads take `&PgPool`; writes that must join a unit of work take
//! `&mut PgConnection` so callers can pass a transaction.

pub mod command_repo;
pub mod operation_command_repo;
pub mod operation_document_repo;
pub mod operation_repo;

pub use command_repo::CommandRepo;
pub use operation_command_repo::OperationCommandRepo;
pub use operation_document_repo::OperationDocumentRepo;
pub use operation_repo::OperationRepo;
