//! Domain types for commands, containers, bindings, and operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Identifier of a physical slot that holds exactly one container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reagent tag declared by a catalog command.
///
/// The catalog is loaded from an external definition file, so the set of
/// tags is open; two tags are compatible only when they are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReagentType(String);

impl ReagentType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReagentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReagentType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ReagentType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A catalog command as seen by the engine.
///
/// Snapshots are immutable for the duration of one engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: DbId,
    pub name: String,
    pub system_name: String,
    pub reagent: ReagentType,
    pub average_time: i64,
    pub volume_waste: i64,
    pub volume_drive_fluid: i64,
    /// Volume drawn from the addressed container per use.
    pub volume_container: i64,
    /// Capacity of a container seeded by this command.
    pub max_volume: i64,
    pub default_address: Address,
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Per-address accumulation of reagent volume within one composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    pub address: Address,
    pub reagent: ReagentType,
    pub volume: i64,
    pub capacity: i64,
}

impl Container {
    /// Seed a container from the first command placed at `address`.
    pub fn seed(address: Address, command: &Command) -> Self {
        Self {
            address,
            reagent: command.reagent.clone(),
            volume: command.volume_container,
            capacity: command.max_volume,
        }
    }

    pub fn is_within_capacity(&self) -> bool {
        self.volume <= self.capacity
    }
}

// ---------------------------------------------------------------------------
// Bindings and operations
// ---------------------------------------------------------------------------

/// One command bound to one address inside an operation.
///
/// `id` is `None` for document-backed operations, whose bindings are
/// embedded and carry no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCommand {
    pub id: Option<DbId>,
    pub operation_id: DbId,
    pub command: Command,
    pub address: Address,
}

/// A persisted operation with its bindings in composition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: DbId,
    pub name: String,
    pub description: String,
    /// Sum of `average_time` over `commands`. Recomputed on every write.
    pub average_time: i64,
    pub version: i64,
    pub commands: Vec<OperationCommand>,
}

/// Parent-row fields of an operation, without its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHeader {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub average_time: i64,
    pub version: i64,
}

/// Scalar fields written to the parent row or document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDraft {
    pub name: String,
    pub description: String,
    pub average_time: i64,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// One requested placement: a catalog command at an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CommandInput {
    #[validate(length(min = 1, max = 255))]
    pub system_name: String,
    #[validate(custom(function = "validate_address"))]
    pub address: Address,
    /// Identity of an already persisted binding this placement replaces.
    #[serde(default)]
    pub id: Option<DbId>,
}

impl CommandInput {
    pub fn new(system_name: impl Into<String>, address: impl Into<Address>) -> Self {
        Self {
            system_name: system_name.into(),
            address: address.into(),
            id: None,
        }
    }

    pub fn existing(
        id: DbId,
        system_name: impl Into<String>,
        address: impl Into<Address>,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(system_name, address)
        }
    }
}

fn validate_address(address: &Address) -> Result<(), validator::ValidationError> {
    if address.as_str().trim().is_empty() {
        return Err(validator::ValidationError::new("empty_address"));
    }
    Ok(())
}

/// Request to create an operation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOperation {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(nested)]
    pub commands: Vec<CommandInput>,
}

/// Request to replace an operation's fields and composition.
///
/// `version` must be the version the caller last read.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOperation {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: i64,
    #[validate(nested)]
    pub commands: Vec<CommandInput>,
}
