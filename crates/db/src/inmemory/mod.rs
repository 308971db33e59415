//! In-memory implementations of the storage traits.

pub mod staking;

pub use staking::StakingDbInMemory;
