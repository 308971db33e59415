//! Storage for the staking ledger.
//!
//! [`staking::StakingDb`] stores the ledger record by record, and [`ledger`] moves a whole
//! [`StakingLedger`](vidstake_ledger::StakingLedger) in and out of any implementation of it.

pub mod errors;
pub mod inmemory;
pub mod ledger;
pub mod staking;
