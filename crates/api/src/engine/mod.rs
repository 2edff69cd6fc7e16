//! Wiring between the transports and the operation engine.
//!
//! [`OperationBackend`] picks the reconciler configured for this deployment;
//! [`catalog`] loads the command catalog from its definition file.

pub mod catalog;
pub mod operations;

pub use operations::OperationBackend;
