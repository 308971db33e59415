//! This crate contains the parameters supplied when a staking ledger is constructed. All nodes
//! replaying the same calls against the same parameters arrive at the same ledger state.

mod default;
pub mod prelude;
pub mod snapshot;
pub mod staking;
