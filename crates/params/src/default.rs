//! Default values used by the development deployment of the staking ledger.

use vidstake_primitives::{Address, Amount, SlashRate};

/// Default minimum stake a delegator must add in a single delegation.
pub(crate) const MIN_DELEGATION: Amount = Amount::from_tokens(6);

/// Default minimum self stake for a transcoder to be bonded.
pub(crate) const MIN_SELF_STAKE: Amount = Amount::from_tokens(10);

/// Default number of seconds a newly registered transcoder stays in the bonding phase.
pub(crate) const APPROVAL_PERIOD: u64 = 5;

/// Default number of seconds before an unbonding request can be withdrawn.
pub(crate) const UNBONDING_PERIOD: u64 = 10;

/// Default share of stake kept by a slashed transcoder and its delegators.
pub(crate) const SLASH_RATE: SlashRate = SlashRate::clamped(50);

/// Default recipient of slashed funds.
pub(crate) const SLASH_FUND: Address = Address::ZERO;

/// Seconds in a day.
pub(crate) const DAY: u64 = 60 * 60 * 24;
