//! This crate implements the staking ledger of the transcoding network.
//!
//! Transcoders register and back their work with stake, delegators add stake on top, and managers
//! punish misbehaving transcoders by slashing them. Slashes are lazy: a slash only bumps a counter
//! on the transcoder, and every stake amount is brought up to date the next time it is touched.
//! The ledger itself never moves funds. Calls return the transfers they require as duties, which
//! the [`service`] layer settles with a treasury.

pub mod access;
pub mod calls;
pub mod changes;
pub mod classifier;
pub mod config;
pub mod duties;
pub mod era;
pub mod errors;
pub mod ledger;
pub mod records;
pub mod service;
mod snapshot;
pub mod unbonding;

pub use calls::{CallCtx, LedgerCall};
pub use errors::{LedgerError, LedgerResult};
pub use ledger::{LedgerParts, StakingLedger, VERSION};

#[cfg(test)]
mod tests;
