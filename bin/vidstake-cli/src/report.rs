//! The JSON report printed after a replay.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use vidstake_ledger::{service::InMemoryTreasury, StakingLedger};
use vidstake_primitives::{Address, Amount, ChangeId, SlashCount, Timestamp, TranscoderState};

/// The state of a ledger and its treasury at a point in time.
#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub(crate) version: &'static str,
    pub(crate) at: Timestamp,
    pub(crate) steps: usize,
    pub(crate) rejected: usize,
    pub(crate) escrow: Amount,
    pub(crate) reserve: Amount,
    pub(crate) last_change_id: ChangeId,
    pub(crate) transcoders: Vec<TranscoderReport>,
    pub(crate) balances: BTreeMap<Address, Amount>,
}

/// The state of one registered transcoder.
#[derive(Debug, Serialize)]
pub(crate) struct TranscoderReport {
    pub(crate) address: Address,
    pub(crate) state: TranscoderState,
    pub(crate) total_stake: Amount,
    pub(crate) settled_total_stake: Amount,
    pub(crate) self_stake: Amount,
    pub(crate) slash_count: SlashCount,
    pub(crate) jailed: bool,
    pub(crate) delegators: usize,
}

impl Report {
    pub(crate) fn new(
        ledger: &StakingLedger,
        treasury: &InMemoryTreasury,
        accounts: &BTreeSet<Address>,
        at: Timestamp,
        steps: usize,
        rejected: usize,
    ) -> Self {
        let transcoders = ledger
            .transcoders()
            .iter()
            .map(|address| TranscoderReport {
                address: *address,
                state: ledger.transcoder_state(address, at),
                total_stake: ledger.total_stake(address),
                settled_total_stake: ledger.settled_total_stake(address),
                self_stake: ledger.self_stake(address),
                slash_count: ledger.slash_count(address),
                jailed: ledger.is_jailed(address),
                delegators: ledger.delegations_to(address).count(),
            })
            .collect();

        let balances = accounts
            .iter()
            .map(|account| (*account, treasury.balance_of(account)))
            .collect();

        Self {
            version: ledger.version(),
            at,
            steps,
            rejected,
            escrow: ledger.escrow(),
            reserve: treasury.reserve(),
            last_change_id: ledger.last_change_id(),
            transcoders,
            balances,
        }
    }
}
