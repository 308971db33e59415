//! The value transfers a call asks the outside world to perform.
//!
//! The ledger never moves funds itself. Each call returns the transfers it requires as duties,
//! and the executor performs them only after the ledger state of the call is committed.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Address, Amount};

/// Why a transfer is made.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferReason {
    /// Pending slashes of a transcoder were realized while settling it.
    SlashRealized {
        /// The settled transcoder.
        transcoder: Address,
    },

    /// Slashes took part of a queued unbonding request before it was withdrawn.
    UnbondingSlashed {
        /// The transcoder the request was filed against.
        transcoder: Address,
    },

    /// Matured unbonding requests were paid out.
    Withdrawal,
}

/// A transfer of funds out of the ledger's escrow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The recipient.
    pub to: Address,

    /// The amount transferred.
    pub amount: Amount,

    /// Why the transfer is made.
    pub reason: TransferReason,
}

/// The duties a ledger call emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerDuty {
    /// Move funds out of the escrow.
    Transfer(Transfer),
}

/// What a call produced besides its state change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerOutput {
    /// Whether the call changed the ledger.
    ///
    /// False for a slash that did not apply and for a change batch that was already applied.
    pub applied: bool,

    /// The duties that need to be performed by the executor.
    pub duties: Vec<LedgerDuty>,
}

impl LedgerOutput {
    /// Creates an output for a call that changed the ledger without emitting duties.
    pub const fn applied() -> Self {
        Self {
            applied: true,
            duties: Vec::new(),
        }
    }

    /// Creates an output for a call that left the ledger untouched.
    pub const fn skipped() -> Self {
        Self {
            applied: false,
            duties: Vec::new(),
        }
    }

    /// Queues a transfer, dropping it if `amount` is zero.
    pub fn push_transfer(&mut self, to: Address, amount: Amount, reason: TransferReason) {
        if amount.is_zero() {
            return;
        }
        self.duties
            .push(LedgerDuty::Transfer(Transfer { to, amount, reason }));
    }

    /// Appends the duties of `other`.
    pub fn extend(&mut self, other: LedgerOutput) {
        self.applied |= other.applied;
        self.duties.extend(other.duties);
    }

    /// Returns the transfers among the duties.
    pub fn transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.duties.iter().map(|duty| match duty {
            LedgerDuty::Transfer(transfer) => transfer,
        })
    }

    /// Returns the sum of all transfers to `to`.
    pub fn transferred_to(&self, to: &Address) -> Amount {
        self.transfers()
            .filter(|t| t.to == *to)
            .fold(Amount::ZERO, |acc, t| {
                acc.checked_add(t.amount).unwrap_or(Amount::MAX)
            })
    }
}
