//! Testing utilities and per-operation tests for the staking ledger.

use vidstake_params::prelude::StakingParams;
use vidstake_primitives::{Address, Amount, Timestamp, TranscoderState};

use crate::{calls::CallCtx, ledger::StakingLedger};

mod register;
mod service;

// ===== Test Constants =====
/// Seconds after registration during which a transcoder is bonding.
pub(super) const APPROVAL_PERIOD: Timestamp = 5;
/// Seconds an unbonding request waits before it can be withdrawn.
pub(super) const UNBONDING_PERIOD: Timestamp = 10;
/// Time at which test transcoders register.
pub(super) const GENESIS: Timestamp = 100;
/// First time at which a transcoder registered at [`GENESIS`] can be bonded.
pub(super) const APPROVED: Timestamp = GENESIS + APPROVAL_PERIOD;

// ===== Accounts =====

/// The owner of the test ledger.
pub(super) fn owner() -> Address {
    Address::from_low_u64(1)
}

/// A manager appointed in some tests.
pub(super) fn manager() -> Address {
    Address::from_low_u64(2)
}

/// The first test transcoder.
pub(super) fn transcoder() -> Address {
    Address::from_low_u64(10)
}

/// The second test transcoder.
pub(super) fn other_transcoder() -> Address {
    Address::from_low_u64(11)
}

/// The first test delegator.
pub(super) fn delegator() -> Address {
    Address::from_low_u64(20)
}

/// The second test delegator.
pub(super) fn other_delegator() -> Address {
    Address::from_low_u64(21)
}

/// The recipient of slashed funds under the default parameters.
pub(super) fn slash_fund() -> Address {
    Address::ZERO
}

// ===== Ledger Helpers =====

/// Shorthand for whole tokens.
pub(super) const fn tokens(n: u64) -> Amount {
    Amount::from_tokens(n)
}

/// Shorthand for a call context.
pub(super) const fn ctx(caller: Address, now: Timestamp) -> CallCtx {
    CallCtx::new(caller, now)
}

/// The development parameters owned by [`owner`].
pub(super) fn test_params() -> StakingParams {
    StakingParams::default().with_owner(owner())
}

/// An empty ledger with the development parameters.
pub(super) fn test_ledger() -> StakingLedger {
    StakingLedger::new(&test_params()).expect("default parameters must build a ledger")
}

/// A ledger in which [`transcoder`] registered at [`GENESIS`] with the minimum self stake.
///
/// The transcoder is bonded from [`APPROVED`] on.
pub(super) fn bonded_ledger() -> StakingLedger {
    let mut ledger = test_ledger();
    ledger
        .register_transcoder(&ctx(transcoder(), GENESIS), 10)
        .expect("must register");
    ledger
        .delegate(&ctx(transcoder(), GENESIS), transcoder(), tokens(10))
        .expect("must self delegate");

    assert_eq!(
        ledger.transcoder_state(&transcoder(), APPROVED),
        TranscoderState::Bonded
    );

    ledger
}

// ===== Invariants =====

/// Asserts that the escrow equals the stored transcoder totals plus the queued requests.
pub(super) fn assert_escrow_conserved(ledger: &StakingLedger) {
    let parts = ledger.to_parts();

    let totals = parts
        .transcoders
        .values()
        .map(|t| t.total_stake.to_units())
        .sum::<u128>();
    let queued = parts
        .unbonding
        .values()
        .flat_map(|q| q.requests())
        .map(|r| r.stake.amount.to_units())
        .sum::<u128>();

    assert_eq!(ledger.escrow().to_units(), totals + queued, "escrow is not conserved");
}

/// Asserts that every transcoder's normalized total covers its normalized delegations.
///
/// Each slash can leave at most one unit of rounding dust per delegating account, so with
/// `accounts` accounts the dust stays below `accounts` units per slash.
pub(super) fn assert_total_covers_delegations(ledger: &StakingLedger, accounts: u128) {
    let parts = ledger.to_parts();

    for (address, record) in &parts.transcoders {
        let total = ledger.total_stake(address).to_units();
        let sum = ledger
            .delegations_to(address)
            .map(|(delegator, _)| ledger.delegator_stake(address, delegator).to_units())
            .sum::<u128>();

        assert!(sum <= total, "delegations of {address} exceed its total");
        assert!(
            total - sum <= accounts * u128::from(record.slash_count),
            "rounding dust of {address} is out of bounds"
        );
    }
}
