//! Batched stake changes applied by a manager on behalf of delegators.
//!
//! Batches carry a `[from_id, to_id)` range of change ids. The ledger remembers the end of the last
//! applied range, so a batch that is delivered twice is applied once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vidstake_primitives::{Address, Amount, ChangeId};

use crate::{
    calls::CallCtx,
    duties::LedgerOutput,
    errors::{LedgerError, LedgerResult},
    ledger::StakingLedger,
};

/// Direction of a stake change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Stake is added to the delegation.
    Deposit,

    /// Stake is moved from the delegation into the unbonding queue.
    Withdraw,
}

/// One stake change decided off-ledger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeChange {
    /// The transcoder whose stake changes.
    pub transcoder: Address,

    /// The delegator the change is made for.
    pub delegator: Address,

    /// The amount deposited or withdrawn.
    pub amount: Amount,

    /// Direction of the change.
    pub kind: ChangeKind,
}

impl StakeChange {
    /// Creates a deposit.
    pub const fn deposit(transcoder: Address, delegator: Address, amount: Amount) -> Self {
        Self {
            transcoder,
            delegator,
            amount,
            kind: ChangeKind::Deposit,
        }
    }

    /// Creates a withdrawal.
    pub const fn withdraw(transcoder: Address, delegator: Address, amount: Amount) -> Self {
        Self {
            transcoder,
            delegator,
            amount,
            kind: ChangeKind::Withdraw,
        }
    }
}

impl StakingLedger {
    /// Applies the changes with ids in `[from_id, to_id)`. Manager only.
    ///
    /// A batch ending at or before the last applied id is accepted without effect. Otherwise the
    /// batch must start exactly where the last one ended. Deposits are not subject to the minimum
    /// delegation and mark the delegator as managed. Either every change applies or none does.
    pub fn apply_changes(
        &mut self,
        ctx: &CallCtx,
        from_id: ChangeId,
        to_id: ChangeId,
        changes: &[StakeChange],
    ) -> LedgerResult<LedgerOutput> {
        self.access.ensure_manager(&ctx.caller)?;

        let mismatch = LedgerError::ChangeRangeMismatch {
            expected: self.last_change_id,
            from_id,
            to_id,
        };

        if to_id < from_id {
            return Err(mismatch);
        }

        if to_id <= self.last_change_id {
            debug!(from_id, to_id, last = self.last_change_id, "change batch already applied");
            return Ok(LedgerOutput::skipped());
        }

        if from_id != self.last_change_id {
            return Err(mismatch);
        }

        let mut staged = self.clone();
        let mut output = LedgerOutput::applied();

        for change in changes {
            if change.amount.is_zero() {
                return Err(LedgerError::InvalidAmount);
            }

            let step = match change.kind {
                ChangeKind::Deposit => {
                    staged.managed.insert(change.delegator);
                    staged.add_stake(change.transcoder, change.delegator, change.amount)?
                }
                ChangeKind::Withdraw => staged.remove_stake(
                    change.transcoder,
                    change.delegator,
                    change.amount,
                    ctx.now,
                )?,
            };
            output.extend(step);
        }

        staged.last_change_id = to_id;
        *self = staged;

        info!(from_id, to_id, changes = changes.len(), "change batch applied");

        Ok(output)
    }
}
