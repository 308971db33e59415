//! Bootstrapping a ledger from a snapshot of an earlier deployment.

use tracing::debug;
use vidstake_params::prelude::SnapshotTranscoder;

use crate::{
    errors::{LedgerError, LedgerResult},
    ledger::StakingLedger,
    records::{Delegation, Transcoder},
};

impl StakingLedger {
    /// Registers every snapshot transcoder with its total as self stake.
    ///
    /// Each transcoder keeps the self-stake minimum it was admitted under. The snapshot stake is
    /// credited to the escrow.
    pub(crate) fn bootstrap(&mut self, snapshot: &[SnapshotTranscoder]) -> LedgerResult<()> {
        for entry in snapshot {
            if self.transcoders.contains_key(&entry.address) {
                return Err(LedgerError::DuplicateSnapshotEntry(entry.address));
            }

            let transcoder = Transcoder {
                self_stake: entry.total,
                total_stake: entry.total,
                effective_min_self_stake: Some(entry.effective_min_self_stake),
                ..Transcoder::registered(entry.timestamp, entry.reward_rate)
            };

            self.escrow = self
                .escrow
                .checked_add(entry.total)
                .ok_or(LedgerError::Overflow("crediting snapshot stake"))?;
            self.transcoders.insert(entry.address, transcoder);
            self.registration_order.push(entry.address);
            if !entry.total.is_zero() {
                self.delegations.insert(
                    (entry.address, entry.address),
                    Delegation::new(entry.total, 0),
                );
            }

            debug!(
                transcoder = %entry.address,
                total = %entry.total,
                registered_at = entry.timestamp,
                "snapshot transcoder restored"
            );
        }

        Ok(())
    }
}
