//! Storage interface for the staking ledger.

use std::collections::BTreeSet;

use async_trait::async_trait;
use vidstake_ledger::{
    access::AccessGateway,
    config::LedgerConfig,
    records::{Delegation, Transcoder},
    unbonding::UnbondingQueue,
};
use vidstake_primitives::{Address, Amount, ChangeId};

use crate::errors::DbResult;

/// The ledger-wide values that are not keyed by account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerMeta {
    /// The owner and managers.
    pub access: AccessGateway,

    /// Registered transcoders in registration order.
    pub registration_order: Vec<Address>,

    /// Delegators managed by a change gateway.
    pub managed: BTreeSet<Address>,

    /// The id the next change batch must start from.
    pub last_change_id: ChangeId,

    /// Funds held by the ledger.
    pub escrow: Amount,
}

/// Interface to store the staking ledger record by record.
///
/// Delegations and unbonding queues are keyed by `(transcoder, delegator)`.
#[async_trait]
pub trait StakingDb {
    /// Gets, if present, the global configuration.
    async fn get_config(&self) -> DbResult<Option<LedgerConfig>>;

    /// Sets the global configuration.
    async fn set_config(&self, config: &LedgerConfig) -> DbResult<()>;

    /// Gets, if present, the ledger-wide values.
    async fn get_meta(&self) -> DbResult<Option<LedgerMeta>>;

    /// Sets the ledger-wide values.
    async fn set_meta(&self, meta: &LedgerMeta) -> DbResult<()>;

    /// Gets, if present, the record of `transcoder`.
    async fn get_transcoder(&self, transcoder: Address) -> DbResult<Option<Transcoder>>;

    /// Sets the record of `transcoder`.
    async fn set_transcoder(&self, transcoder: Address, record: &Transcoder) -> DbResult<()>;

    /// Lists the addresses that have a transcoder record.
    async fn list_transcoders(&self) -> DbResult<Vec<Address>>;

    /// Gets, if present, the delegation of `delegator` to `transcoder`.
    async fn get_delegation(
        &self,
        transcoder: Address,
        delegator: Address,
    ) -> DbResult<Option<Delegation>>;

    /// Sets the delegation of `delegator` to `transcoder`. A zero delegation removes the entry.
    async fn set_delegation(
        &self,
        transcoder: Address,
        delegator: Address,
        delegation: &Delegation,
    ) -> DbResult<()>;

    /// Lists the `(transcoder, delegator)` keys that have a delegation.
    async fn list_delegations(&self) -> DbResult<Vec<(Address, Address)>>;

    /// Gets, if present, the unbonding requests of `delegator` against `transcoder`.
    async fn get_unbonding_requests(
        &self,
        transcoder: Address,
        delegator: Address,
    ) -> DbResult<Option<UnbondingQueue>>;

    /// Sets the unbonding requests of `delegator` against `transcoder`. An empty queue removes
    /// the entry.
    async fn set_unbonding_requests(
        &self,
        transcoder: Address,
        delegator: Address,
        queue: &UnbondingQueue,
    ) -> DbResult<()>;

    /// Lists the `(transcoder, delegator)` keys that have queued unbonding requests.
    async fn list_unbonding_requests(&self) -> DbResult<Vec<(Address, Address)>>;
}
