//! The global configuration of a ledger.

use serde::{Deserialize, Serialize};
use vidstake_params::prelude::StakingParams;
use vidstake_primitives::{Address, Amount, SlashRate};

/// The global configuration of a ledger.
///
/// Fixed at construction except for `min_self_stake`, which managers may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Minimum amount of a single delegation by someone other than the transcoder.
    pub min_delegation: Amount,

    /// Minimum normalized self stake for a transcoder to be bonded.
    pub min_self_stake: Amount,

    /// Seconds after registration during which a transcoder is bonding.
    pub approval_period: u64,

    /// Seconds an unbonding request waits before it can be withdrawn.
    pub unbonding_period: u64,

    /// Share of stake that survives a slash.
    pub slash_rate: SlashRate,

    /// Recipient of slashed funds.
    pub slash_fund: Address,
}

impl From<&StakingParams> for LedgerConfig {
    fn from(params: &StakingParams) -> Self {
        Self {
            min_delegation: params.min_delegation,
            min_self_stake: params.min_self_stake,
            approval_period: params.approval_period,
            unbonding_period: params.unbonding_period,
            slash_rate: params.slash_rate,
            slash_fund: params.slash_fund,
        }
    }
}
