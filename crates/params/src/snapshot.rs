//! Transcoder records carried over from a previous deployment of the ledger.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Address, Amount, Timestamp};

/// A transcoder that existed before the ledger was deployed.
///
/// Bootstrapping from a snapshot recreates the transcoder without replaying its history: it is
/// registered at `timestamp` and holds `total` as self stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTranscoder {
    /// The account of the transcoder.
    pub address: Address,

    /// The stake held by the transcoder at snapshot time.
    pub total: Amount,

    /// The time at which the transcoder originally registered.
    pub timestamp: Timestamp,

    /// Opaque reward metadata.
    pub reward_rate: u64,

    /// The self-stake minimum the transcoder was admitted under.
    ///
    /// The transcoder keeps being judged against this value instead of the global minimum.
    pub effective_min_self_stake: Amount,
}
