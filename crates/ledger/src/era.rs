//! Era-stamped stake amounts and the lazy slashing law.
//!
//! A slash never walks the delegations of a transcoder. It only bumps the transcoder's slash
//! counter. Every stored amount carries the counter value (its *era*) at which it was last
//! normalized; its real value today is obtained by applying the slash rate once for every era that
//! passed since.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Amount, SlashCount, SlashRate};

/// Applies `rate` to `amount` once for every slash between era `from` and era `to`.
///
/// Rounds down after every era. Eras at or before `from` are already accounted for, so `to <=
/// from` returns `amount` unchanged.
pub fn normalize(amount: Amount, from: SlashCount, to: SlashCount, rate: SlashRate) -> Amount {
    if rate.is_identity() {
        return amount;
    }

    let mut value = amount;
    for _ in from..to {
        if value.is_zero() {
            break;
        }
        value = value.retain(rate);
    }
    value
}

/// An amount recorded at a given slash era.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraAmount {
    /// The amount as it stood when it was last normalized.
    pub amount: Amount,

    /// The slash count of the transcoder at the time `amount` was last normalized.
    pub era: SlashCount,
}

impl EraAmount {
    /// Creates a new era-stamped amount.
    pub const fn new(amount: Amount, era: SlashCount) -> Self {
        Self { amount, era }
    }

    /// Returns the value of this amount at era `current`.
    pub fn value_at(&self, current: SlashCount, rate: SlashRate) -> Amount {
        normalize(self.amount, self.era, current, rate)
    }

    /// Returns the same stake restated at era `current`.
    pub fn rebase(self, current: SlashCount, rate: SlashRate) -> Self {
        Self::new(self.value_at(current, rate), current.max(self.era))
    }

    /// Returns true if nothing is left of the stake.
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}
