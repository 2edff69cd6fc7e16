//! Operation and operation-command entity models (relational store).

use labflow_core::operation::{
    Address, Command, Operation as DomainOperation, OperationCommand as DomainOperationCommand,
    OperationHeader, ReagentType,
};
use labflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `operations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Operation {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub average_time: i64,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Operation {
    pub fn header(&self) -> OperationHeader {
        OperationHeader {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            average_time: self.average_time,
            version: self.version,
        }
    }

    /// Attach bindings (already in position order) to this row.
    pub fn with_commands(self, commands: Vec<OperationCommand>) -> DomainOperation {
        DomainOperation {
            id: self.id,
            name: self.name,
            description: self.description,
            average_time: self.average_time,
            version: self.version,
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }
}

/// An `operation_commands` row with its command snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OperationCommand {
    pub id: DbId,
    pub operation_id: DbId,
    pub address: String,
    pub position: i32,
    pub command_id: DbId,
    pub command_name: String,
    pub system_name: String,
    pub reagent: String,
    pub average_time: i64,
    pub volume_waste: i64,
    pub volume_drive_fluid: i64,
    pub volume_container: i64,
    pub max_volume: i64,
    pub default_address: String,
}

impl From<OperationCommand> for DomainOperationCommand {
    fn from(row: OperationCommand) -> Self {
        DomainOperationCommand {
            id: Some(row.id),
            operation_id: row.operation_id,
            address: Address::from(row.address),
            command: Command {
                id: row.command_id,
                name: row.command_name,
                system_name: row.system_name,
                reagent: ReagentType::from(row.reagent),
                average_time: row.average_time,
                volume_waste: row.volume_waste,
                volume_drive_fluid: row.volume_drive_fluid,
                volume_container: row.volume_container,
                max_volume: row.max_volume,
                default_address: Address::from(row.default_address),
            },
        }
    }
}

/// DTO for inserting or rewriting one binding row.
#[derive(Debug, Clone)]
pub struct WriteOperationCommand<'a> {
    pub command: &'a Command,
    pub address: &'a str,
    pub position: i32,
}
