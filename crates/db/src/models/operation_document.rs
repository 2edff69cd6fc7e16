//! Operation document entity model (document store).
//!
//! Bindings are embedded in the `commands` JSONB column as an array of
//! `{ "command": {...}, "address": "..." }` snapshots.

use labflow_core::operation::{EmbeddedCommand, Operation, OperationCommand};
use labflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `operation_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OperationDocumentRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub average_time: i64,
    pub version: i64,
    pub commands: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OperationDocumentRow {
    /// Decode the embedded array into an operation.
    pub fn into_operation(self) -> Result<Operation, serde_json::Error> {
        let embedded: Vec<EmbeddedCommand> = serde_json::from_value(self.commands)?;
        let id = self.id;
        Ok(Operation {
            id,
            name: self.name,
            description: self.description,
            average_time: self.average_time,
            version: self.version,
            commands: embedded
                .into_iter()
                .map(|c| OperationCommand {
                    id: None,
                    operation_id: id,
                    command: c.command,
                    address: c.address,
                })
                .collect(),
        })
    }
}
