//! Command catalog definition files.
//!
//! The catalog is maintained as a JSON array of command definitions and
//! synced into the store by system name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::operation::{Address, ReagentType};

/// One entry of a catalog definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    pub system_name: String,
    pub reagent: ReagentType,
    pub average_time: i64,
    #[serde(default)]
    pub volume_waste: i64,
    #[serde(default)]
    pub volume_drive_fluid: i64,
    pub volume_container: i64,
    pub max_volume: i64,
    pub default_address: Address,
}

/// Parse and check a catalog definition file.
///
/// Rejects blank system names, negative quantities, and system names that
/// appear more than once (a later entry would silently win on sync).
pub fn parse_definitions(json: &str) -> Result<Vec<CommandDefinition>, CoreError> {
    let definitions: Vec<CommandDefinition> = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Invalid command catalog file: {e}")))?;

    let mut seen = HashSet::new();
    for (index, def) in definitions.iter().enumerate() {
        if def.system_name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Command at index {index} has an empty system_name"
            )));
        }
        if !seen.insert(def.system_name.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate system_name '{}' in command catalog file",
                def.system_name
            )));
        }
        let quantities = [
            ("average_time", def.average_time),
            ("volume_waste", def.volume_waste),
            ("volume_drive_fluid", def.volume_drive_fluid),
            ("volume_container", def.volume_container),
            ("max_volume", def.max_volume),
        ];
        if let Some((field, value)) = quantities.iter().find(|(_, v)| *v < 0) {
            return Err(CoreError::Validation(format!(
                "Command '{}' has negative {field}: {value}",
                def.system_name
            )));
        }
    }

    Ok(definitions)
}
