//! Account identities.

use std::{fmt, str::FromStr};

use proptest::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{constants::ADDRESS_LEN, errors::PrimitivesError};

/// A 20-byte account identity.
///
/// Transcoders, delegators, managers and the slash fund are all identified by an [`Address`]. The
/// human-readable form is a `0x`-prefixed lowercase hex string, which is also the serialized form.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Creates an address from its raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose trailing eight bytes hold `n` in big-endian order.
    ///
    /// Handy for deterministic fixtures and scenario files.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Returns the address as a byte slice.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns true if every byte of the address is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = PrimitivesError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| PrimitivesError::InvalidAddress(hex::encode(bytes)))?;
        Ok(Self(array))
    }
}

impl FromStr for Address {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| PrimitivesError::InvalidAddress(s.into()))?;

        Self::try_from(bytes.as_slice()).map_err(|_| PrimitivesError::InvalidAddress(s.into()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Generates an arbitrary [`Address`].
pub fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; ADDRESS_LEN]>().prop_map(Address::new)
}
