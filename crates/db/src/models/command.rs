//! Command catalog entity model.

use labflow_core::operation::{Address, Command as CatalogCommand, ReagentType};
use labflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `commands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Command {
    pub id: DbId,
    pub name: String,
    pub system_name: String,
    pub reagent: String,
    pub average_time: i64,
    pub volume_waste: i64,
    pub volume_drive_fluid: i64,
    pub volume_container: i64,
    pub max_volume: i64,
    pub default_address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Command> for CatalogCommand {
    fn from(row: Command) -> Self {
        CatalogCommand {
            id: row.id,
            name: row.name,
            system_name: row.system_name,
            reagent: ReagentType::from(row.reagent),
            average_time: row.average_time,
            volume_waste: row.volume_waste,
            volume_drive_fluid: row.volume_drive_fluid,
            volume_container: row.volume_container,
            max_volume: row.max_volume,
            default_address: Address::from(row.default_address),
        }
    }
}
