//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Conversions into the engine's domain types where the row feeds it

pub mod command;
pub mod operation;
pub mod operation_document;
