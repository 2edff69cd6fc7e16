//! Domain core for laboratory operation composition.
//!
//! Holds the pure container-allocation rules, the binding set builder,
//! the storage capability traits, and the two reconcilers (relational and
//! document) that drive those traits. Nothing in this crate performs I/O
//! directly; the `labflow-db` crate supplies the PostgreSQL stores.

pub mod catalog;
pub mod error;
pub mod operation;
pub mod types;
