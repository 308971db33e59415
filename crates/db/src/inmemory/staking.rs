//! In-memory database for the staking ledger.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;
use vidstake_ledger::{
    config::LedgerConfig,
    records::{Delegation, Transcoder},
    unbonding::UnbondingQueue,
};
use vidstake_primitives::Address;

use crate::{
    errors::DbResult,
    staking::{LedgerMeta, StakingDb},
};

/// A map keyed by `(transcoder, delegator)`.
pub type PairTable<T> = BTreeMap<(Address, Address), T>;

/// In-memory database for the staking ledger.
#[derive(Debug, Default, Clone)]
pub struct StakingDbInMemory {
    config: Arc<RwLock<Option<LedgerConfig>>>,

    meta: Arc<RwLock<Option<LedgerMeta>>>,

    /// transcoder -> record
    transcoders: Arc<RwLock<BTreeMap<Address, Transcoder>>>,

    /// (transcoder, delegator) -> delegation
    delegations: Arc<RwLock<PairTable<Delegation>>>,

    /// (transcoder, delegator) -> unbonding requests
    unbonding: Arc<RwLock<PairTable<UnbondingQueue>>>,
}

#[async_trait]
impl StakingDb for StakingDbInMemory {
    async fn get_config(&self) -> DbResult<Option<LedgerConfig>> {
        Ok(self.config.read().await.clone())
    }

    async fn set_config(&self, config: &LedgerConfig) -> DbResult<()> {
        trace!(action = "trying to acquire wlock on config");
        let mut entry = self.config.write().await;
        trace!(event = "acquired wlock on config");

        *entry = Some(config.clone());

        Ok(())
    }

    async fn get_meta(&self) -> DbResult<Option<LedgerMeta>> {
        Ok(self.meta.read().await.clone())
    }

    async fn set_meta(&self, meta: &LedgerMeta) -> DbResult<()> {
        trace!(action = "trying to acquire wlock on ledger meta");
        let mut entry = self.meta.write().await;
        trace!(event = "acquired wlock on ledger meta");

        *entry = Some(meta.clone());

        Ok(())
    }

    async fn get_transcoder(&self, transcoder: Address) -> DbResult<Option<Transcoder>> {
        Ok(self.transcoders.read().await.get(&transcoder).cloned())
    }

    async fn set_transcoder(&self, transcoder: Address, record: &Transcoder) -> DbResult<()> {
        trace!(action = "trying to acquire wlock on transcoders", %transcoder);
        let mut transcoders = self.transcoders.write().await;
        trace!(event = "acquired wlock on transcoders", %transcoder);

        transcoders.insert(transcoder, record.clone());

        Ok(())
    }

    async fn list_transcoders(&self) -> DbResult<Vec<Address>> {
        Ok(self.transcoders.read().await.keys().copied().collect())
    }

    async fn get_delegation(
        &self,
        transcoder: Address,
        delegator: Address,
    ) -> DbResult<Option<Delegation>> {
        Ok(self
            .delegations
            .read()
            .await
            .get(&(transcoder, delegator))
            .copied())
    }

    async fn set_delegation(
        &self,
        transcoder: Address,
        delegator: Address,
        delegation: &Delegation,
    ) -> DbResult<()> {
        trace!(action = "trying to acquire wlock on delegations", %transcoder, %delegator);
        let mut delegations = self.delegations.write().await;
        trace!(event = "acquired wlock on delegations", %transcoder, %delegator);

        if delegation.is_zero() {
            delegations.remove(&(transcoder, delegator));
        } else {
            delegations.insert((transcoder, delegator), *delegation);
        }

        Ok(())
    }

    async fn list_delegations(&self) -> DbResult<Vec<(Address, Address)>> {
        Ok(self.delegations.read().await.keys().copied().collect())
    }

    async fn get_unbonding_requests(
        &self,
        transcoder: Address,
        delegator: Address,
    ) -> DbResult<Option<UnbondingQueue>> {
        Ok(self
            .unbonding
            .read()
            .await
            .get(&(transcoder, delegator))
            .cloned())
    }

    async fn set_unbonding_requests(
        &self,
        transcoder: Address,
        delegator: Address,
        queue: &UnbondingQueue,
    ) -> DbResult<()> {
        trace!(action = "trying to acquire wlock on unbonding requests", %transcoder, %delegator);
        let mut unbonding = self.unbonding.write().await;
        trace!(event = "acquired wlock on unbonding requests", %transcoder, %delegator);

        if queue.is_empty() {
            unbonding.remove(&(transcoder, delegator));
        } else {
            unbonding.insert((transcoder, delegator), queue.clone());
        }

        Ok(())
    }

    async fn list_unbonding_requests(&self) -> DbResult<Vec<(Address, Address)>> {
        Ok(self.unbonding.read().await.keys().copied().collect())
    }
}
