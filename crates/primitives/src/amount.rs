//! Token amounts.

use std::{fmt, str::FromStr};

use proptest::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{constants::UNIT, errors::PrimitivesError, types::SlashRate};

/// An amount of the staking token in base units.
///
/// Amounts routinely exceed what fits in an `i64` (one token is `10^18` base units), so the
/// serialized form is a decimal string. Plain integers are accepted when deserializing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// The largest representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates an amount from base units.
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Creates an amount from whole tokens.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * UNIT)
    }

    /// Returns the amount in base units.
    pub const fn to_units(self) -> u128 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns [`None`] on overflow.
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns [`None`] on underflow.
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating subtraction.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Returns the share of this amount that survives one slash at `rate`, rounded down.
    ///
    /// Computed as `floor(self * rate / 100)` without intermediate overflow.
    pub const fn retain(self, rate: SlashRate) -> Self {
        let r = rate.as_percent() as u128;
        Self((self.0 / 100) * r + (self.0 % 100) * r / 100)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != '_').collect();
        digits
            .parse::<u128>()
            .map(Self)
            .map_err(|_| PrimitivesError::InvalidAmount(s.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(v as u128))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                u128::try_from(v)
                    .map(Amount)
                    .map_err(|_| E::custom(format!("negative amount {v}")))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
                Ok(Amount(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Generates an arbitrary [`Amount`] no larger than `max` base units.
pub fn arb_amount(max: u128) -> impl Strategy<Value = Amount> {
    (0..=max).prop_map(Amount::from_units)
}
