//! Small shared types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{constants::PERCENT_DENOMINATOR, errors::PrimitivesError};

/// Wall-clock time in seconds, as supplied by the execution environment.
pub type Timestamp = u64;

/// Number of slashes applied to a transcoder; identifies a slash era.
pub type SlashCount = u64;

/// Identifier of an externally supplied stake change.
pub type ChangeId = u64;

/// The percentage of stake that survives a single slash.
///
/// A rate of `50` halves every stake attached to a slashed transcoder, `100` leaves it untouched
/// and `0` wipes it out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlashRate(u8);

impl SlashRate {
    /// Creates a new slash rate, rejecting values above 100.
    pub const fn new(percent: u8) -> Result<Self, PrimitivesError> {
        if percent > PERCENT_DENOMINATOR {
            return Err(PrimitivesError::SlashRateOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    /// Creates a new slash rate, clamping values above 100 to 100.
    pub const fn clamped(percent: u8) -> Self {
        if percent > PERCENT_DENOMINATOR {
            Self(PERCENT_DENOMINATOR)
        } else {
            Self(percent)
        }
    }

    /// Returns the rate as a percentage.
    pub const fn as_percent(&self) -> u8 {
        self.0
    }

    /// Returns true if applying the rate never changes an amount.
    pub const fn is_identity(&self) -> bool {
        self.0 == PERCENT_DENOMINATOR
    }
}

impl TryFrom<u8> for SlashRate {
    type Error = PrimitivesError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<SlashRate> for u8 {
    fn from(rate: SlashRate) -> Self {
        rate.0
    }
}

impl fmt::Display for SlashRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// The lifecycle phase of a transcoder.
///
/// The phase is never stored; it is derived from ledger facts and the current time every time it
/// is queried.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranscoderState {
    /// Registered less than an approval period ago.
    Bonding,

    /// Approved, not jailed and holding enough self stake.
    Bonded,

    /// Not eligible for work and not on its way out.
    Unbonded,

    /// Below the self-stake minimum while its own unbonding request is still maturing.
    Unbonding,
}

impl fmt::Display for TranscoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TranscoderState::Bonding => "BONDING",
            TranscoderState::Bonded => "BONDED",
            TranscoderState::Unbonded => "UNBONDED",
            TranscoderState::Unbonding => "UNBONDING",
        };
        f.write_str(s)
    }
}
