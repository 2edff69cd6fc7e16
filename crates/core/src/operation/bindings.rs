//! Binding set builder: the ordered bindings produced by a validated
//! composition, classified for reconciliation.

use crate::types::DbId;

use super::model::{Address, Command, OperationCommand};

/// Whether a binding replaces a persisted row or is new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingIdentity {
    New,
    Existing(DbId),
}

impl From<Option<DbId>> for BindingIdentity {
    fn from(id: Option<DbId>) -> Self {
        id.map_or(Self::New, Self::Existing)
    }
}

/// A validated binding awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBinding {
    pub identity: BindingIdentity,
    pub command: Command,
    pub address: Address,
    /// Zero-based index in the composition.
    pub position: i32,
}

/// Ordered bindings of one composition. Order always equals input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSet {
    bindings: Vec<PendingBinding>,
}

impl BindingSet {
    pub(crate) fn push(
        &mut self,
        identity: BindingIdentity,
        command: Command,
        address: Address,
        position: i32,
    ) {
        self.bindings.push(PendingBinding {
            identity,
            command,
            address,
            position,
        });
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingBinding> {
        self.bindings.iter()
    }

    /// Bindings that carry a prior identity, paired with that identity.
    pub fn existing(&self) -> impl Iterator<Item = (DbId, &PendingBinding)> {
        self.bindings.iter().filter_map(|b| match b.identity {
            BindingIdentity::Existing(id) => Some((id, b)),
            BindingIdentity::New => None,
        })
    }

    /// Bindings with no prior identity.
    pub fn new_bindings(&self) -> Vec<&PendingBinding> {
        self.bindings
            .iter()
            .filter(|b| b.identity == BindingIdentity::New)
            .collect()
    }

    /// Identities that must survive reconciliation.
    pub fn retained_ids(&self) -> Vec<DbId> {
        self.existing().map(|(id, _)| id).collect()
    }

    /// Sum of command durations over all bindings.
    pub fn total_time(&self) -> i64 {
        self.bindings.iter().map(|b| b.command.average_time).sum()
    }

    /// Materialise bindings for an operation, without row identities.
    pub fn to_operation_commands(&self, operation_id: DbId) -> Vec<OperationCommand> {
        self.bindings
            .iter()
            .map(|b| OperationCommand {
                id: None,
                operation_id,
                command: b.command.clone(),
                address: b.address.clone(),
            })
            .collect()
    }
}
