//! Time-locked unbonding requests.

use serde::{Deserialize, Serialize};
use vidstake_primitives::{Amount, SlashCount, SlashRate, Timestamp};

use crate::era::EraAmount;

/// Stake taken out of a delegation that becomes withdrawable at `matures_at`.
///
/// Slashes that hit the transcoder while the request waits still reduce its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingRequest {
    /// The requested amount, stamped with the transcoder's slash count at request time.
    pub stake: EraAmount,

    /// The earliest time the request can be withdrawn.
    pub matures_at: Timestamp,
}

impl UnbondingRequest {
    /// Creates a new request.
    pub const fn new(amount: Amount, slash_count: SlashCount, matures_at: Timestamp) -> Self {
        Self {
            stake: EraAmount::new(amount, slash_count),
            matures_at,
        }
    }

    /// Returns true if the request can be withdrawn at `now`.
    pub const fn is_matured(&self, now: Timestamp) -> bool {
        self.matures_at <= now
    }

    /// Returns the value of the request given the transcoder's current slash count.
    pub fn value_at(&self, slash_count: SlashCount, rate: SlashRate) -> Amount {
        self.stake.value_at(slash_count, rate)
    }
}

/// The unbonding requests of one delegator against one transcoder.
///
/// Entries are kept in request order but withdrawal scans all of them, so a matured entry never
/// waits for an older unmatured one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingQueue(Vec<UnbondingRequest>);

impl UnbondingQueue {
    /// Appends a request.
    pub fn push(&mut self, request: UnbondingRequest) {
        self.0.push(request);
    }

    /// Returns the number of queued requests.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no request is queued.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the queued requests.
    pub fn requests(&self) -> &[UnbondingRequest] {
        &self.0
    }

    /// Returns true if at least one request can be withdrawn at `now`.
    pub fn has_matured(&self, now: Timestamp) -> bool {
        self.0.iter().any(|r| r.is_matured(now))
    }

    /// Returns true if at least one request is still waiting at `now`.
    pub fn has_unmatured(&self, now: Timestamp) -> bool {
        self.0.iter().any(|r| !r.is_matured(now))
    }

    /// Splits the queue into the requests withdrawable at `now` and the queue that remains.
    pub fn split_matured(&self, now: Timestamp) -> (Vec<UnbondingRequest>, UnbondingQueue) {
        let (matured, waiting): (Vec<_>, Vec<_>) =
            self.0.iter().copied().partition(|r| r.is_matured(now));
        (matured, UnbondingQueue(waiting))
    }
}

impl From<Vec<UnbondingRequest>> for UnbondingQueue {
    fn from(requests: Vec<UnbondingRequest>) -> Self {
        Self(requests)
    }
}

impl From<UnbondingQueue> for Vec<UnbondingRequest> {
    fn from(queue: UnbondingQueue) -> Self {
        queue.0
    }
}
