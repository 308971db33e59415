//! Calls that can be submitted to the ledger as data.
//!
//! Every operation of [`StakingLedger`](crate::StakingLedger) has a matching [`LedgerCall`]
//! variant, which lets executors and replay tools drive the ledger from recorded calls.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Address, Amount, ChangeId, Timestamp};

use crate::changes::{ChangeKind, StakeChange};

/// The ambient context of a call: who makes it and when.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCtx {
    /// The account making the call.
    pub caller: Address,

    /// The time of the call as supplied by the execution environment.
    pub now: Timestamp,
}

impl CallCtx {
    /// Creates a new call context.
    pub const fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

/// A call to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum LedgerCall {
    /// Register the caller as a transcoder.
    RegisterTranscoder {
        /// Opaque reward metadata.
        reward_rate: u64,
    },

    /// Delegate `value` to `transcoder`.
    Delegate {
        /// The transcoder to back.
        transcoder: Address,
        /// The attached funds.
        value: Amount,
    },

    /// Move `amount` of the caller's stake on `transcoder` into the unbonding queue.
    RequestUnbonding {
        /// The transcoder to unbond from.
        transcoder: Address,
        /// The amount to unbond.
        amount: Amount,
    },

    /// Withdraw every matured unbonding request of the caller, optionally against one
    /// transcoder only.
    WithdrawPending {
        /// Restricts the withdrawal to requests against this transcoder.
        #[serde(default)]
        transcoder: Option<Address>,
    },

    /// Withdraw every matured unbonding request of the caller.
    WithdrawAllPending,

    /// Slash a bonded transcoder.
    Slash {
        /// The transcoder to slash.
        transcoder: Address,
    },

    /// Release a transcoder from jail.
    Unjail {
        /// The transcoder to release.
        transcoder: Address,
    },

    /// Change the minimum self stake.
    SetSelfMinStake {
        /// The new minimum.
        value: Amount,
    },

    /// Appoint a manager.
    AddManager {
        /// The account to appoint.
        manager: Address,
    },

    /// Revoke a manager.
    RemoveManager {
        /// The account to revoke.
        manager: Address,
    },

    /// Apply a batch of stake changes decided off-ledger.
    ApplyChanges {
        /// The first change id of the batch.
        from_id: ChangeId,
        /// The id following the last change of the batch.
        to_id: ChangeId,
        /// The changes, applied in order.
        changes: Vec<StakeChange>,
    },
}

impl LedgerCall {
    /// Returns the funds the caller must attach to the call.
    pub fn attached_value(&self) -> Amount {
        match self {
            LedgerCall::Delegate { value, .. } => *value,
            LedgerCall::ApplyChanges { changes, .. } => changes
                .iter()
                .filter(|c| c.kind == ChangeKind::Deposit)
                .fold(Amount::ZERO, |acc, c| {
                    acc.checked_add(c.amount).unwrap_or(Amount::MAX)
                }),
            _ => Amount::ZERO,
        }
    }

    /// Returns a short name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            LedgerCall::RegisterTranscoder { .. } => "register_transcoder",
            LedgerCall::Delegate { .. } => "delegate",
            LedgerCall::RequestUnbonding { .. } => "request_unbonding",
            LedgerCall::WithdrawPending { .. } => "withdraw_pending",
            LedgerCall::WithdrawAllPending => "withdraw_all_pending",
            LedgerCall::Slash { .. } => "slash",
            LedgerCall::Unjail { .. } => "unjail",
            LedgerCall::SetSelfMinStake { .. } => "set_self_min_stake",
            LedgerCall::AddManager { .. } => "add_manager",
            LedgerCall::RemoveManager { .. } => "remove_manager",
            LedgerCall::ApplyChanges { .. } => "apply_changes",
        }
    }
}
