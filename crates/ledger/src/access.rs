//! Authorization of privileged calls.
//!
//! A single owner is fixed at construction. The owner may appoint additional managers, such as a
//! gateway that relays stake changes decided off-ledger. Slashing, unjailing, changing the minimum
//! self stake and applying change batches are open to the owner and every manager.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;
use vidstake_primitives::Address;

use crate::errors::{LedgerError, LedgerResult};

/// The owner of the ledger and the set of appointed managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGateway {
    owner: Address,
    managers: BTreeSet<Address>,
}

impl AccessGateway {
    /// Creates a gateway with no managers besides the owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            managers: BTreeSet::new(),
        }
    }

    /// Creates a gateway from persisted parts.
    pub fn from_parts(owner: Address, managers: impl IntoIterator<Item = Address>) -> Self {
        Self {
            owner,
            managers: managers.into_iter().collect(),
        }
    }

    /// Returns the owner.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Returns the appointed managers.
    pub fn managers(&self) -> impl Iterator<Item = &Address> {
        self.managers.iter()
    }

    /// Returns true if `who` is the owner or an appointed manager.
    pub fn is_manager(&self, who: &Address) -> bool {
        *who == self.owner || self.managers.contains(who)
    }

    /// Fails with [`LedgerError::Unauthorized`] unless `who` is the owner or a manager.
    pub fn ensure_manager(&self, who: &Address) -> LedgerResult<()> {
        if self.is_manager(who) {
            return Ok(());
        }

        warn!(caller = %who, "rejected privileged call");
        Err(LedgerError::Unauthorized(*who))
    }

    /// Fails with [`LedgerError::Unauthorized`] unless `who` is the owner.
    pub fn ensure_owner(&self, who: &Address) -> LedgerResult<()> {
        if *who == self.owner {
            return Ok(());
        }

        warn!(caller = %who, "rejected owner-only call");
        Err(LedgerError::Unauthorized(*who))
    }

    /// Appoints a manager. Returns false if it already was one.
    pub fn add_manager(&mut self, manager: Address) -> bool {
        self.managers.insert(manager)
    }

    /// Revokes a manager. Returns false if it was not one.
    pub fn remove_manager(&mut self, manager: &Address) -> bool {
        self.managers.remove(manager)
    }
}
