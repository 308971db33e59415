//! Errors that can occur while applying a call to the staking ledger.

use thiserror::Error;
use vidstake_primitives::{Address, Amount, ChangeId};

/// Errors that can occur while applying a call to the staking ledger.
///
/// Every error aborts the whole call; the ledger is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The caller already has a transcoder record.
    #[error("transcoder {0} is already registered")]
    AlreadyRegistered(Address),

    /// A delegation by someone other than the transcoder is below the minimum.
    #[error("delegation of {value} is below the minimum of {minimum}")]
    BelowMinimumDelegation {
        /// The amount that was offered.
        value: Amount,
        /// The configured minimum delegation.
        minimum: Amount,
    },

    /// The caller does not hold enough stake to unbond the requested amount.
    #[error("insufficient stake: requested {requested}, available {available}")]
    InsufficientStake {
        /// The amount that was requested.
        requested: Amount,
        /// The normalized stake the caller holds.
        available: Amount,
    },

    /// The caller has no queued unbonding requests.
    #[error("no pending requests")]
    NoPendingRequests,

    /// The caller has queued unbonding requests but none of them has matured yet.
    #[error("failed to withdraw stake: no request has matured")]
    NothingMatured,

    /// The caller is neither the owner nor a manager.
    #[error("{0} is not authorized to perform this call")]
    Unauthorized(Address),

    /// A zero amount was supplied where a positive one is required.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// The ledger has no record for the given transcoder.
    #[error("unknown transcoder {0}")]
    UnknownTranscoder(Address),

    /// A change batch does not continue the last applied change range.
    #[error("change range {from_id}..{to_id} does not continue from {expected}")]
    ChangeRangeMismatch {
        /// The id the next batch must start from.
        expected: ChangeId,
        /// The first id of the rejected batch.
        from_id: ChangeId,
        /// The last id of the rejected batch.
        to_id: ChangeId,
    },

    /// The bootstrap snapshot lists the same transcoder twice.
    #[error("snapshot lists transcoder {0} more than once")]
    DuplicateSnapshotEntry(Address),

    /// An amount left the representable range.
    #[error("arithmetic overflow while {0}")]
    Overflow(&'static str),
}

/// The result type for operations on the staking ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;
