//! Errors for the primitive types.

use thiserror::Error;

/// Error while parsing or validating a primitive value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitivesError {
    /// The address is not a valid hex string of the expected length.
    #[error("invalid address {0:?}: expected 0x-prefixed 20-byte hex")]
    InvalidAddress(String),

    /// The amount is not a valid non-negative integer.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// The slash rate is above 100.
    #[error("slash rate must be within 0..=100, got {0}")]
    SlashRateOutOfRange(u8),
}
