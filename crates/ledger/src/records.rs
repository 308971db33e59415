//! The records the ledger keeps per transcoder and per delegation.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Amount, SlashCount, SlashRate, Timestamp};

use crate::era::EraAmount;

/// The stake a delegator holds with a transcoder.
///
/// The era of the record is the transcoder's slash count at the delegator's last touch.
pub type Delegation = EraAmount;

/// Everything the ledger knows about a transcoder.
///
/// A record comes into existence either when the transcoder registers or when the first stake is
/// delegated to its address, whichever happens first. Records are never deleted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcoder {
    /// When the transcoder registered; [`None`] for an address that only received delegations.
    pub registered_at: Option<Timestamp>,

    /// Opaque reward metadata.
    pub reward_rate: u64,

    /// Stake the transcoder delegated to itself, stated at `settled_era`.
    pub self_stake: Amount,

    /// Stake delegated to the transcoder by anyone, stated at `settled_era`.
    pub total_stake: Amount,

    /// The slash count at which `self_stake` and `total_stake` were last settled.
    pub settled_era: SlashCount,

    /// Number of slashes applied so far.
    pub slash_count: SlashCount,

    /// Whether the transcoder is jailed.
    pub jailed: bool,

    /// The self-stake minimum the transcoder was admitted under, overriding the global minimum.
    ///
    /// Only transcoders bootstrapped from a snapshot carry one.
    pub effective_min_self_stake: Option<Amount>,
}

impl Transcoder {
    /// Creates the record of a freshly registered transcoder.
    pub fn registered(now: Timestamp, reward_rate: u64) -> Self {
        Self {
            registered_at: Some(now),
            reward_rate,
            ..Default::default()
        }
    }

    /// Returns true if the transcoder has registered.
    pub const fn is_registered(&self) -> bool {
        self.registered_at.is_some()
    }

    /// Returns the total stake after applying every pending slash.
    pub fn normalized_total_stake(&self, rate: SlashRate) -> Amount {
        EraAmount::new(self.total_stake, self.settled_era).value_at(self.slash_count, rate)
    }

    /// Returns the self stake after applying every pending slash.
    pub fn normalized_self_stake(&self, rate: SlashRate) -> Amount {
        EraAmount::new(self.self_stake, self.settled_era).value_at(self.slash_count, rate)
    }

    /// Returns the amount that slashes have taken from the total stake but that has not been
    /// moved out of the ledger yet.
    pub fn unrealized_slash(&self, rate: SlashRate) -> Amount {
        self.total_stake
            .saturating_sub(self.normalized_total_stake(rate))
    }

    /// Brings the stake fields up to the current slash era.
    ///
    /// Returns the amount that the pending slashes took away, which the caller must forward to the
    /// slash fund.
    pub fn settle(&mut self, rate: SlashRate) -> Amount {
        let realized = self.unrealized_slash(rate);

        self.self_stake = self.normalized_self_stake(rate);
        self.total_stake = self.normalized_total_stake(rate);
        self.settled_era = self.slash_count;

        realized
    }

    /// Returns true if a slash has been recorded but not yet realized.
    pub const fn has_pending_slash(&self) -> bool {
        self.settled_era < self.slash_count
    }
}
