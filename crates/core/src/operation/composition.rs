//! Container allocation validator.
//!
//! Turns an ordered list of `(system_name, address)` placements into a
//! [`Composition`]: the per-address container plan, the ordered binding
//! set, and the aggregate duration. The first placement at an address
//! decides its reagent and capacity; later placements must agree on the
//! reagent and fit in the remaining volume. Any failure rejects the whole
//! composition.

use std::collections::{HashMap, HashSet};

use super::bindings::{BindingIdentity, BindingSet};
use super::error::CompositionError;
use super::model::{Address, Command, CommandInput, Container};

/// Largest number of placements a single composition may hold.
pub const MAX_COMMANDS: usize = 10_000;

/// Catalog snapshot keyed by command system name.
pub type CatalogSnapshot = HashMap<String, Command>;

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub bindings: BindingSet,
    pub containers: ContainerPlan,
    pub total_time: i64,
}

/// Containers in order of first use, indexed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerPlan {
    containers: Vec<Container>,
    index: HashMap<Address, usize>,
}

impl ContainerPlan {
    /// Place one use of `command` at `address`.
    pub fn place(&mut self, address: &Address, command: &Command) -> Result<(), CompositionError> {
        let slot = match self.index.get(address).copied() {
            None => {
                let slot = self.containers.len();
                self.index.insert(address.clone(), slot);
                self.containers
                    .push(Container::seed(address.clone(), command));
                slot
            }
            Some(slot) => {
                let container = &mut self.containers[slot];
                if container.reagent != command.reagent {
                    return Err(CompositionError::DuplicateAddress {
                        address: address.clone(),
                        existing: container.reagent.clone(),
                        requested: command.reagent.clone(),
                    });
                }
                // An overflowing sum can never fit, whatever the capacity.
                let Some(volume) = container.volume.checked_add(command.volume_container) else {
                    return Err(CompositionError::VolumeExceeded {
                        address: address.clone(),
                        volume: container.volume.saturating_add(command.volume_container),
                        capacity: container.capacity,
                    });
                };
                container.volume = volume;
                slot
            }
        };

        let container = &self.containers[slot];
        if !container.is_within_capacity() {
            return Err(CompositionError::VolumeExceeded {
                address: address.clone(),
                volume: container.volume,
                capacity: container.capacity,
            });
        }
        Ok(())
    }

    pub fn get(&self, address: &Address) -> Option<&Container> {
        self.index.get(address).map(|&slot| &self.containers[slot])
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }
}

/// Validate `inputs` against `catalog`.
pub fn validate(
    catalog: &CatalogSnapshot,
    inputs: &[CommandInput],
) -> Result<Composition, CompositionError> {
    let mut containers = ContainerPlan::default();
    let mut bindings = BindingSet::default();
    let mut seen_ids = HashSet::new();
    let mut total_time: i64 = 0;

    if inputs.len() > MAX_COMMANDS {
        return Err(CompositionError::TooManyCommands {
            count: inputs.len(),
            limit: MAX_COMMANDS,
        });
    }

    for (position, input) in inputs.iter().enumerate() {
        let command = catalog.get(&input.system_name).ok_or_else(|| {
            CompositionError::CommandNotFound {
                system_name: input.system_name.clone(),
                position,
            }
        })?;

        containers.place(&input.address, command)?;

        if let Some(id) = input.id {
            if !seen_ids.insert(id) {
                return Err(CompositionError::DuplicateBinding { binding_id: id });
            }
        }

        let index = i32::try_from(position).map_err(|_| CompositionError::TooManyCommands {
            count: inputs.len(),
            limit: MAX_COMMANDS,
        })?;
        bindings.push(
            BindingIdentity::from(input.id),
            command.clone(),
            input.address.clone(),
            index,
        );
        total_time = total_time
            .checked_add(command.average_time)
            .ok_or(CompositionError::DurationOverflow { position })?;
    }

    Ok(Composition {
        bindings,
        containers,
        total_time,
    })
}
