//! Constants shared across the staking workspace.

/// Number of base units in one whole token (18 decimals).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Denominator used to interpret a [`SlashRate`](crate::SlashRate) as a fraction.
pub const PERCENT_DENOMINATOR: u8 = 100;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;
