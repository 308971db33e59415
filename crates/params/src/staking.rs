//! Parameters for the staking ledger such as the stake minimums, the waiting periods and the slash
//! rate.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Address, Amount, SlashRate};

use crate::{
    default::{
        APPROVAL_PERIOD, DAY, MIN_DELEGATION, MIN_SELF_STAKE, SLASH_FUND, SLASH_RATE,
        UNBONDING_PERIOD,
    },
    snapshot::SnapshotTranscoder,
};

/// The parameters a staking ledger is constructed with.
///
/// Apart from `min_self_stake`, which the manager may change later, these values are fixed for the
/// lifetime of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// The minimum amount a delegator must add in a single delegation.
    ///
    /// Self delegations by the transcoder are exempt.
    pub min_delegation: Amount,

    /// The minimum self stake a transcoder must hold to be bonded.
    pub min_self_stake: Amount,

    /// The number of seconds after registration during which a transcoder is bonding.
    pub approval_period: u64,

    /// The number of seconds an unbonding request must wait before it can be withdrawn.
    pub unbonding_period: u64,

    /// The share of stake that survives a slash.
    pub slash_rate: SlashRate,

    /// The account that receives slashed funds.
    pub slash_fund: Address,

    /// The account allowed to slash, unjail, change the minimum self stake and appoint managers.
    pub owner: Address,

    /// Transcoders carried over from a previous deployment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snapshot: Vec<SnapshotTranscoder>,
}

impl StakingParams {
    /// Returns the parameters of the production deployment.
    ///
    /// Slashing is disabled there by keeping nothing on slash, so `slash_rate` is zero.
    pub fn mainnet(owner: Address) -> Self {
        Self {
            min_delegation: Amount::from_tokens(1),
            min_self_stake: Amount::from_tokens(333_333),
            approval_period: 10 * DAY,
            unbonding_period: 21 * DAY,
            slash_rate: SlashRate::clamped(0),
            slash_fund: Address::ZERO,
            owner,
            snapshot: Vec::new(),
        }
    }

    /// Sets the owner of the ledger.
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    /// Adds transcoders to bootstrap the ledger with.
    pub fn with_snapshot(mut self, snapshot: Vec<SnapshotTranscoder>) -> Self {
        self.snapshot = snapshot;
        self
    }
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            min_delegation: MIN_DELEGATION,
            min_self_stake: MIN_SELF_STAKE,
            approval_period: APPROVAL_PERIOD,
            unbonding_period: UNBONDING_PERIOD,
            slash_rate: SLASH_RATE,
            slash_fund: SLASH_FUND,
            owner: Address::ZERO,
            snapshot: Vec::new(),
        }
    }
}
