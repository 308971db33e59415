//! The staking ledger.
//!
//! Owns the transcoder records, the delegations and the unbonding queues. Every mutating call
//! first settles the transcoder it touches, realizing the slashes recorded since the last touch,
//! and only then applies the requested change. Calls validate and compute on copies of the
//! records they touch and write them back at the very end, so a failing call leaves no trace.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};
use vidstake_params::prelude::StakingParams;
use vidstake_primitives::{Address, Amount, ChangeId, SlashCount, Timestamp, TranscoderState};

use crate::{
    access::AccessGateway,
    calls::{CallCtx, LedgerCall},
    classifier::transcoder_state,
    config::LedgerConfig,
    duties::{LedgerOutput, TransferReason},
    errors::{LedgerError, LedgerResult},
    records::{Delegation, Transcoder},
    unbonding::{UnbondingQueue, UnbondingRequest},
};

/// The version reported to the contract registry.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maps a `(transcoder, delegator)` pair to a value.
pub type PairMap<T> = BTreeMap<(Address, Address), T>;

/// The economic security ledger of the transcoding network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingLedger {
    pub(crate) config: LedgerConfig,
    pub(crate) access: AccessGateway,
    pub(crate) transcoders: BTreeMap<Address, Transcoder>,
    pub(crate) registration_order: Vec<Address>,

    /// (transcoder, delegator) -> delegation
    pub(crate) delegations: PairMap<Delegation>,

    /// delegator -> transcoder -> queue
    pub(crate) unbonding: BTreeMap<Address, BTreeMap<Address, UnbondingQueue>>,

    /// Delegators whose stake is managed by a change gateway.
    pub(crate) managed: BTreeSet<Address>,

    /// The id the next change batch must start from.
    pub(crate) last_change_id: ChangeId,

    /// Funds held by the ledger.
    pub(crate) escrow: Amount,
}

/// The full state of a ledger, laid out for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerParts {
    /// The global configuration.
    pub config: LedgerConfig,
    /// The owner and managers.
    pub access: AccessGateway,
    /// Transcoder records by address.
    pub transcoders: BTreeMap<Address, Transcoder>,
    /// Registered transcoders in registration order.
    pub registration_order: Vec<Address>,
    /// Delegations by `(transcoder, delegator)`.
    pub delegations: PairMap<Delegation>,
    /// Unbonding queues by `(transcoder, delegator)`.
    pub unbonding: PairMap<UnbondingQueue>,
    /// Delegators managed by a change gateway.
    pub managed: BTreeSet<Address>,
    /// The id the next change batch must start from.
    pub last_change_id: ChangeId,
    /// Funds held by the ledger.
    pub escrow: Amount,
}

impl StakingLedger {
    /// Creates a ledger from its construction parameters, bootstrapping any snapshot transcoders.
    pub fn new(params: &StakingParams) -> LedgerResult<Self> {
        let mut ledger = Self::empty(LedgerConfig::from(params), AccessGateway::new(params.owner));
        ledger.bootstrap(&params.snapshot)?;

        info!(
            owner = %params.owner,
            slash_rate = %params.slash_rate,
            snapshot = params.snapshot.len(),
            "staking ledger created"
        );

        Ok(ledger)
    }

    fn empty(config: LedgerConfig, access: AccessGateway) -> Self {
        Self {
            config,
            access,
            transcoders: BTreeMap::new(),
            registration_order: Vec::new(),
            delegations: BTreeMap::new(),
            unbonding: BTreeMap::new(),
            managed: BTreeSet::new(),
            last_change_id: 0,
            escrow: Amount::ZERO,
        }
    }

    /// Rebuilds a ledger from persisted parts.
    pub fn from_parts(parts: LedgerParts) -> Self {
        let mut unbonding: BTreeMap<Address, BTreeMap<Address, UnbondingQueue>> = BTreeMap::new();
        for ((transcoder, delegator), queue) in parts.unbonding {
            if !queue.is_empty() {
                unbonding
                    .entry(delegator)
                    .or_default()
                    .insert(transcoder, queue);
            }
        }

        Self {
            config: parts.config,
            access: parts.access,
            transcoders: parts.transcoders,
            registration_order: parts.registration_order,
            delegations: parts.delegations,
            unbonding,
            managed: parts.managed,
            last_change_id: parts.last_change_id,
            escrow: parts.escrow,
        }
    }

    /// Returns the full state of the ledger laid out for persistence.
    pub fn to_parts(&self) -> LedgerParts {
        let unbonding = self
            .unbonding
            .iter()
            .flat_map(|(delegator, queues)| {
                queues
                    .iter()
                    .map(move |(transcoder, queue)| ((*transcoder, *delegator), queue.clone()))
            })
            .collect();

        LedgerParts {
            config: self.config.clone(),
            access: self.access.clone(),
            transcoders: self.transcoders.clone(),
            registration_order: self.registration_order.clone(),
            delegations: self.delegations.clone(),
            unbonding,
            managed: self.managed.clone(),
            last_change_id: self.last_change_id,
            escrow: self.escrow,
        }
    }

    /// Applies a call given as data.
    pub fn process_call(&mut self, ctx: &CallCtx, call: LedgerCall) -> LedgerResult<LedgerOutput> {
        debug!(caller = %ctx.caller, now = ctx.now, call = call.name(), "processing call");

        match call {
            LedgerCall::RegisterTranscoder { reward_rate } => self
                .register_transcoder(ctx, reward_rate)
                .map(|_| LedgerOutput::applied()),
            LedgerCall::Delegate { transcoder, value } => self.delegate(ctx, transcoder, value),
            LedgerCall::RequestUnbonding { transcoder, amount } => {
                self.request_unbonding(ctx, transcoder, amount)
            }
            LedgerCall::WithdrawPending { transcoder: None } => self.withdraw_pending(ctx),
            LedgerCall::WithdrawPending {
                transcoder: Some(transcoder),
            } => self.withdraw_pending_from(ctx, transcoder),
            LedgerCall::WithdrawAllPending => self.withdraw_all_pending(ctx),
            LedgerCall::Slash { transcoder } => self.slash(ctx, transcoder).map(|slashed| {
                if slashed {
                    LedgerOutput::applied()
                } else {
                    LedgerOutput::skipped()
                }
            }),
            LedgerCall::Unjail { transcoder } => self
                .unjail(ctx, transcoder)
                .map(|_| LedgerOutput::applied()),
            LedgerCall::SetSelfMinStake { value } => self
                .set_self_min_stake(ctx, value)
                .map(|_| LedgerOutput::applied()),
            LedgerCall::AddManager { manager } => {
                self.add_manager(ctx, manager).map(|added| LedgerOutput {
                    applied: added,
                    duties: Vec::new(),
                })
            }
            LedgerCall::RemoveManager { manager } => {
                self.remove_manager(ctx, manager).map(|removed| LedgerOutput {
                    applied: removed,
                    duties: Vec::new(),
                })
            }
            LedgerCall::ApplyChanges {
                from_id,
                to_id,
                changes,
            } => self.apply_changes(ctx, from_id, to_id, &changes),
        }
    }

    /// Registers the caller as a transcoder.
    ///
    /// Stake already delegated to the caller's address is kept.
    pub fn register_transcoder(&mut self, ctx: &CallCtx, reward_rate: u64) -> LedgerResult<()> {
        if self
            .transcoders
            .get(&ctx.caller)
            .is_some_and(Transcoder::is_registered)
        {
            return Err(LedgerError::AlreadyRegistered(ctx.caller));
        }

        let transcoder = self.transcoders.entry(ctx.caller).or_default();
        transcoder.registered_at = Some(ctx.now);
        transcoder.reward_rate = reward_rate;
        self.registration_order.push(ctx.caller);

        info!(transcoder = %ctx.caller, reward_rate, now = ctx.now, "transcoder registered");

        Ok(())
    }

    /// Delegates `value` from the caller to `transcoder`.
    ///
    /// Delegations by anyone but the transcoder itself must reach the minimum delegation; the
    /// minimum applies to each call, not to the accumulated stake.
    pub fn delegate(
        &mut self,
        ctx: &CallCtx,
        transcoder: Address,
        value: Amount,
    ) -> LedgerResult<LedgerOutput> {
        if value.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }

        if ctx.caller != transcoder && value < self.config.min_delegation {
            return Err(LedgerError::BelowMinimumDelegation {
                value,
                minimum: self.config.min_delegation,
            });
        }

        self.add_stake(transcoder, ctx.caller, value)
    }

    /// Moves `amount` of the caller's stake on `transcoder` into the unbonding queue.
    pub fn request_unbonding(
        &mut self,
        ctx: &CallCtx,
        transcoder: Address,
        amount: Amount,
    ) -> LedgerResult<LedgerOutput> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }

        self.remove_stake(transcoder, ctx.caller, amount, ctx.now)
    }

    /// Withdraws every matured unbonding request of the caller.
    pub fn withdraw_pending(&mut self, ctx: &CallCtx) -> LedgerResult<LedgerOutput> {
        self.withdraw(ctx, None)
    }

    /// Withdraws every matured unbonding request of the caller across all transcoders.
    pub fn withdraw_all_pending(&mut self, ctx: &CallCtx) -> LedgerResult<LedgerOutput> {
        self.withdraw(ctx, None)
    }

    /// Withdraws the matured unbonding requests of the caller against `transcoder`.
    pub fn withdraw_pending_from(
        &mut self,
        ctx: &CallCtx,
        transcoder: Address,
    ) -> LedgerResult<LedgerOutput> {
        self.withdraw(ctx, Some(transcoder))
    }

    /// Slashes a bonded transcoder.
    ///
    /// Only bumps the slash counter and jails the transcoder. The stake reduction is realized the
    /// next time the transcoder's stake is touched. Returns false, changing nothing, if the
    /// transcoder is not bonded.
    pub fn slash(&mut self, ctx: &CallCtx, transcoder: Address) -> LedgerResult<bool> {
        self.access.ensure_manager(&ctx.caller)?;

        let state = self.transcoder_state(&transcoder, ctx.now);
        if state != TranscoderState::Bonded {
            debug!(%transcoder, %state, "slash skipped, transcoder not bonded");
            return Ok(false);
        }

        let Some(record) = self.transcoders.get_mut(&transcoder) else {
            return Ok(false);
        };
        record.slash_count = record.slash_count.saturating_add(1);
        record.jailed = true;

        info!(
            %transcoder,
            slash_count = record.slash_count,
            by = %ctx.caller,
            "transcoder slashed"
        );

        Ok(true)
    }

    /// Releases a transcoder from jail. Stake and slash count are left as they are.
    pub fn unjail(&mut self, ctx: &CallCtx, transcoder: Address) -> LedgerResult<()> {
        self.access.ensure_manager(&ctx.caller)?;

        let record = self
            .transcoders
            .get_mut(&transcoder)
            .ok_or(LedgerError::UnknownTranscoder(transcoder))?;
        record.jailed = false;

        info!(%transcoder, by = %ctx.caller, "transcoder unjailed");

        Ok(())
    }

    /// Changes the minimum self stake.
    pub fn set_self_min_stake(&mut self, ctx: &CallCtx, value: Amount) -> LedgerResult<()> {
        self.access.ensure_manager(&ctx.caller)?;

        info!(old = %self.config.min_self_stake, new = %value, "minimum self stake changed");
        self.config.min_self_stake = value;

        Ok(())
    }

    /// Appoints a manager. Owner only. Returns false if it already was one.
    pub fn add_manager(&mut self, ctx: &CallCtx, manager: Address) -> LedgerResult<bool> {
        self.access.ensure_owner(&ctx.caller)?;

        let added = self.access.add_manager(manager);
        info!(%manager, added, "manager appointed");

        Ok(added)
    }

    /// Revokes a manager. Owner only. Returns false if it was not one.
    pub fn remove_manager(&mut self, ctx: &CallCtx, manager: Address) -> LedgerResult<bool> {
        self.access.ensure_owner(&ctx.caller)?;

        let removed = self.access.remove_manager(&manager);
        info!(%manager, removed, "manager revoked");

        Ok(removed)
    }

    /// Adds `value` to the stake `delegator` holds with `transcoder`, settling the transcoder
    /// first.
    pub(crate) fn add_stake(
        &mut self,
        transcoder: Address,
        delegator: Address,
        value: Amount,
    ) -> LedgerResult<LedgerOutput> {
        let rate = self.config.slash_rate;

        let mut record = self
            .transcoders
            .get(&transcoder)
            .cloned()
            .unwrap_or_default();
        let realized = record.settle(rate);
        let era = record.slash_count;

        let key = (transcoder, delegator);
        let mut delegation = self
            .delegations
            .get(&key)
            .copied()
            .unwrap_or_else(|| Delegation::new(Amount::ZERO, era))
            .rebase(era, rate);

        delegation.amount = delegation
            .amount
            .checked_add(value)
            .ok_or(LedgerError::Overflow("adding to a delegation"))?;
        record.total_stake = record
            .total_stake
            .checked_add(value)
            .ok_or(LedgerError::Overflow("adding to the total stake"))?;
        if delegator == transcoder {
            record.self_stake = record
                .self_stake
                .checked_add(value)
                .ok_or(LedgerError::Overflow("adding to the self stake"))?;
        }
        let escrow = self
            .escrow
            .checked_add(value)
            .and_then(|escrow| escrow.checked_sub(realized))
            .ok_or(LedgerError::Overflow("crediting the escrow"))?;

        debug!(
            %transcoder,
            %delegator,
            %value,
            total = %record.total_stake,
            %realized,
            "stake added"
        );

        self.transcoders.insert(transcoder, record);
        self.delegations.insert(key, delegation);
        self.escrow = escrow;

        let mut output = LedgerOutput::applied();
        output.push_transfer(
            self.config.slash_fund,
            realized,
            TransferReason::SlashRealized { transcoder },
        );

        Ok(output)
    }

    /// Moves `amount` of the stake `delegator` holds with `transcoder` into a new unbonding
    /// request, settling the transcoder first.
    pub(crate) fn remove_stake(
        &mut self,
        transcoder: Address,
        delegator: Address,
        amount: Amount,
        now: Timestamp,
    ) -> LedgerResult<LedgerOutput> {
        let rate = self.config.slash_rate;
        let key = (transcoder, delegator);

        let (Some(record), Some(delegation)) =
            (self.transcoders.get(&transcoder), self.delegations.get(&key))
        else {
            return Err(LedgerError::InsufficientStake {
                requested: amount,
                available: Amount::ZERO,
            });
        };

        let mut record = record.clone();
        let realized = record.settle(rate);
        let era = record.slash_count;

        let mut delegation = delegation.rebase(era, rate);
        if delegation.amount < amount {
            return Err(LedgerError::InsufficientStake {
                requested: amount,
                available: delegation.amount,
            });
        }

        delegation.amount = delegation.amount.saturating_sub(amount);
        record.total_stake = record
            .total_stake
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow("releasing total stake"))?;
        if delegator == transcoder {
            record.self_stake = record
                .self_stake
                .checked_sub(amount)
                .ok_or(LedgerError::Overflow("releasing self stake"))?;
        }
        let escrow = self
            .escrow
            .checked_sub(realized)
            .ok_or(LedgerError::Overflow("debiting the escrow"))?;
        let matures_at = now.saturating_add(self.config.unbonding_period);

        debug!(
            %transcoder,
            %delegator,
            %amount,
            matures_at,
            total = %record.total_stake,
            %realized,
            "unbonding requested"
        );

        self.transcoders.insert(transcoder, record);
        if delegation.is_zero() {
            self.delegations.remove(&key);
        } else {
            self.delegations.insert(key, delegation);
        }
        self.unbonding
            .entry(delegator)
            .or_default()
            .entry(transcoder)
            .or_default()
            .push(UnbondingRequest::new(amount, era, matures_at));
        self.escrow = escrow;

        let mut output = LedgerOutput::applied();
        output.push_transfer(
            self.config.slash_fund,
            realized,
            TransferReason::SlashRealized { transcoder },
        );

        Ok(output)
    }

    /// Pays out the matured unbonding requests of the caller, optionally restricted to one
    /// transcoder.
    ///
    /// Either every matured request in scope is paid and removed, or the call fails and nothing
    /// changes.
    fn withdraw(&mut self, ctx: &CallCtx, scope: Option<Address>) -> LedgerResult<LedgerOutput> {
        let rate = self.config.slash_rate;
        let slash_fund = self.config.slash_fund;

        let queues: Vec<(Address, &UnbondingQueue)> = self
            .unbonding
            .get(&ctx.caller)
            .into_iter()
            .flat_map(|queues| queues.iter())
            .filter(|(transcoder, queue)| {
                !queue.is_empty() && scope.map_or(true, |scope| scope == **transcoder)
            })
            .map(|(transcoder, queue)| (*transcoder, queue))
            .collect();

        if queues.is_empty() {
            return Err(LedgerError::NoPendingRequests);
        }

        if !queues.iter().any(|(_, queue)| queue.has_matured(ctx.now)) {
            return Err(LedgerError::NothingMatured);
        }

        let mut output = LedgerOutput::applied();
        let mut payout = Amount::ZERO;
        let mut escrow = self.escrow;
        let mut settled = Vec::new();
        let mut remaining = Vec::new();

        for (transcoder, queue) in queues {
            let (matured, waiting) = queue.split_matured(ctx.now);
            if matured.is_empty() {
                continue;
            }

            let mut record = self
                .transcoders
                .get(&transcoder)
                .cloned()
                .unwrap_or_default();
            let realized = record.settle(rate);

            let mut lost = Amount::ZERO;
            for request in &matured {
                let value = request.value_at(record.slash_count, rate);
                payout = payout
                    .checked_add(value)
                    .ok_or(LedgerError::Overflow("summing the payout"))?;
                lost = lost
                    .checked_add(request.stake.amount.saturating_sub(value))
                    .ok_or(LedgerError::Overflow("summing slashed requests"))?;
                escrow = escrow
                    .checked_sub(request.stake.amount)
                    .ok_or(LedgerError::Overflow("debiting the escrow"))?;
            }
            escrow = escrow
                .checked_sub(realized)
                .ok_or(LedgerError::Overflow("debiting the escrow"))?;

            debug!(
                %transcoder,
                delegator = %ctx.caller,
                matured = matured.len(),
                waiting = waiting.len(),
                %lost,
                %realized,
                "unbonding requests withdrawn"
            );

            output.push_transfer(
                slash_fund,
                realized,
                TransferReason::SlashRealized { transcoder },
            );
            output.push_transfer(
                slash_fund,
                lost,
                TransferReason::UnbondingSlashed { transcoder },
            );

            settled.push((transcoder, record));
            remaining.push((transcoder, waiting));
        }

        output.push_transfer(ctx.caller, payout, TransferReason::Withdrawal);

        for (transcoder, record) in settled {
            self.transcoders.insert(transcoder, record);
        }
        if let Some(queues) = self.unbonding.get_mut(&ctx.caller) {
            for (transcoder, waiting) in remaining {
                if waiting.is_empty() {
                    queues.remove(&transcoder);
                } else {
                    queues.insert(transcoder, waiting);
                }
            }
            if queues.is_empty() {
                self.unbonding.remove(&ctx.caller);
            }
        }
        self.escrow = escrow;

        info!(delegator = %ctx.caller, %payout, "withdrawal paid");

        Ok(output)
    }

    /// Returns the global configuration.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Returns the owner and managers.
    pub const fn access(&self) -> &AccessGateway {
        &self.access
    }

    /// Returns the version reported to the contract registry.
    pub const fn version(&self) -> &'static str {
        VERSION
    }

    /// Returns the current minimum self stake.
    pub const fn min_self_stake(&self) -> Amount {
        self.config.min_self_stake
    }

    /// Returns the funds held by the ledger.
    pub const fn escrow(&self) -> Amount {
        self.escrow
    }

    /// Returns the id the next change batch must start from.
    pub const fn last_change_id(&self) -> ChangeId {
        self.last_change_id
    }

    /// Returns the record of `transcoder`, if any.
    pub fn transcoder(&self, transcoder: &Address) -> Option<&Transcoder> {
        self.transcoders.get(transcoder)
    }

    /// Returns the registered transcoders in registration order.
    pub fn transcoders(&self) -> &[Address] {
        &self.registration_order
    }

    /// Returns the number of registered transcoders.
    pub fn transcoders_count(&self) -> usize {
        self.registration_order.len()
    }

    /// Returns the transcoder registered at position `index`.
    pub fn transcoder_at(&self, index: usize) -> Option<Address> {
        self.registration_order.get(index).copied()
    }

    /// Returns the lifecycle phase of `transcoder` at `now`.
    pub fn transcoder_state(&self, transcoder: &Address, now: Timestamp) -> TranscoderState {
        let Some(record) = self.transcoders.get(transcoder) else {
            return TranscoderState::Unbonded;
        };

        let own_unbonding = self
            .unbonding
            .get(transcoder)
            .and_then(|queues| queues.get(transcoder));

        transcoder_state(record, own_unbonding, &self.config, now)
    }

    /// Returns the total stake of `transcoder` with every recorded slash applied.
    pub fn total_stake(&self, transcoder: &Address) -> Amount {
        self.transcoders
            .get(transcoder)
            .map(|record| record.normalized_total_stake(self.config.slash_rate))
            .unwrap_or_default()
    }

    /// Returns the total stake of `transcoder` as last settled.
    ///
    /// Unlike [`Self::total_stake`] this does not move when a slash is recorded, only when the
    /// slash is realized by the next call that touches the transcoder.
    pub fn settled_total_stake(&self, transcoder: &Address) -> Amount {
        self.transcoders
            .get(transcoder)
            .map(|record| record.total_stake)
            .unwrap_or_default()
    }

    /// Returns the self stake of `transcoder` with every recorded slash applied.
    pub fn self_stake(&self, transcoder: &Address) -> Amount {
        self.transcoders
            .get(transcoder)
            .map(|record| record.normalized_self_stake(self.config.slash_rate))
            .unwrap_or_default()
    }

    /// Returns the stake `delegator` holds with `transcoder` with every recorded slash applied.
    pub fn delegator_stake(&self, transcoder: &Address, delegator: &Address) -> Amount {
        let Some(delegation) = self.delegations.get(&(*transcoder, *delegator)) else {
            return Amount::ZERO;
        };

        delegation.value_at(self.slash_count(transcoder), self.config.slash_rate)
    }

    /// Returns the number of slashes recorded against `transcoder`.
    pub fn slash_count(&self, transcoder: &Address) -> SlashCount {
        self.transcoders
            .get(transcoder)
            .map(|record| record.slash_count)
            .unwrap_or_default()
    }

    /// Returns true if `transcoder` is jailed.
    pub fn is_jailed(&self, transcoder: &Address) -> bool {
        self.transcoders
            .get(transcoder)
            .is_some_and(|record| record.jailed)
    }

    /// Returns true if `delegator`'s stake is managed by a change gateway.
    pub fn is_managed(&self, delegator: &Address) -> bool {
        self.managed.contains(delegator)
    }

    /// Returns the unbonding requests `delegator` filed against `transcoder`.
    pub fn unbonding_requests(
        &self,
        transcoder: &Address,
        delegator: &Address,
    ) -> Option<&UnbondingQueue> {
        self.unbonding
            .get(delegator)
            .and_then(|queues| queues.get(transcoder))
    }

    /// Returns true if `delegator` has any queued unbonding request.
    pub fn has_pending_requests(&self, delegator: &Address) -> bool {
        self.unbonding
            .get(delegator)
            .is_some_and(|queues| queues.values().any(|queue| !queue.is_empty()))
    }

    /// Returns true if `delegator` has an unbonding request that can be withdrawn at `now`.
    pub fn pending_withdrawals_exist(&self, delegator: &Address, now: Timestamp) -> bool {
        self.unbonding
            .get(delegator)
            .is_some_and(|queues| queues.values().any(|queue| queue.has_matured(now)))
    }

    /// Returns the delegations to `transcoder`.
    pub fn delegations_to<'a>(
        &'a self,
        transcoder: &'a Address,
    ) -> impl Iterator<Item = (&'a Address, &'a Delegation)> + 'a {
        self.delegations
            .range((*transcoder, Address::ZERO)..)
            .take_while(move |((t, _), _)| t == transcoder)
            .map(|((_, delegator), delegation)| (delegator, delegation))
    }
}
