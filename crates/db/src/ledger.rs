//! Moving a whole ledger in and out of a [`StakingDb`].

use std::collections::BTreeMap;

use tracing::{debug, info};
use vidstake_ledger::{records::Delegation, unbonding::UnbondingQueue, LedgerParts, StakingLedger};

use crate::{
    errors::{DbError, DbResult},
    staking::{LedgerMeta, StakingDb},
};

/// Writes every record of `ledger` to `db`.
///
/// Delegations and unbonding queues that exist in `db` but no longer in the ledger are removed.
pub async fn persist_ledger(db: &impl StakingDb, ledger: &StakingLedger) -> DbResult<()> {
    let parts = ledger.to_parts();

    db.set_config(&parts.config).await?;
    db.set_meta(&LedgerMeta {
        access: parts.access,
        registration_order: parts.registration_order,
        managed: parts.managed,
        last_change_id: parts.last_change_id,
        escrow: parts.escrow,
    })
    .await?;

    for (address, record) in &parts.transcoders {
        db.set_transcoder(*address, record).await?;
    }

    for (transcoder, delegator) in db.list_delegations().await? {
        if !parts.delegations.contains_key(&(transcoder, delegator)) {
            debug!(%transcoder, %delegator, "dropping stale delegation");
            db.set_delegation(transcoder, delegator, &Delegation::default())
                .await?;
        }
    }
    for ((transcoder, delegator), delegation) in &parts.delegations {
        db.set_delegation(*transcoder, *delegator, delegation).await?;
    }

    for (transcoder, delegator) in db.list_unbonding_requests().await? {
        if !parts.unbonding.contains_key(&(transcoder, delegator)) {
            debug!(%transcoder, %delegator, "dropping withdrawn unbonding requests");
            db.set_unbonding_requests(transcoder, delegator, &UnbondingQueue::default())
                .await?;
        }
    }
    for ((transcoder, delegator), queue) in &parts.unbonding {
        db.set_unbonding_requests(*transcoder, *delegator, queue)
            .await?;
    }

    info!(
        transcoders = parts.transcoders.len(),
        delegations = parts.delegations.len(),
        unbonding = parts.unbonding.len(),
        "ledger persisted"
    );

    Ok(())
}

/// Reads a ledger back from `db`.
///
/// Returns [`None`] if no ledger was ever persisted.
pub async fn restore_ledger(db: &impl StakingDb) -> DbResult<Option<StakingLedger>> {
    let Some(config) = db.get_config().await? else {
        return Ok(None);
    };
    let meta = db
        .get_meta()
        .await?
        .ok_or_else(|| DbError::NotFound("ledger meta".to_string()))?;

    let mut transcoders = BTreeMap::new();
    for address in db.list_transcoders().await? {
        let record = db
            .get_transcoder(address)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("transcoder {address}")))?;
        transcoders.insert(address, record);
    }

    let mut delegations = BTreeMap::new();
    for (transcoder, delegator) in db.list_delegations().await? {
        let delegation = db
            .get_delegation(transcoder, delegator)
            .await?
            .ok_or_else(|| {
                DbError::NotFound(format!("delegation of {delegator} to {transcoder}"))
            })?;
        delegations.insert((transcoder, delegator), delegation);
    }

    let mut unbonding = BTreeMap::new();
    for (transcoder, delegator) in db.list_unbonding_requests().await? {
        let queue = db
            .get_unbonding_requests(transcoder, delegator)
            .await?
            .ok_or_else(|| {
                DbError::NotFound(format!("unbonding of {delegator} from {transcoder}"))
            })?;
        unbonding.insert((transcoder, delegator), queue);
    }

    info!(
        transcoders = transcoders.len(),
        delegations = delegations.len(),
        unbonding = unbonding.len(),
        "ledger restored"
    );

    Ok(Some(StakingLedger::from_parts(LedgerParts {
        config,
        access: meta.access,
        transcoders,
        registration_order: meta.registration_order,
        delegations,
        unbonding,
        managed: meta.managed,
        last_change_id: meta.last_change_id,
        escrow: meta.escrow,
    })))
}

#[cfg(test)]
mod tests {
    use vidstake_ledger::CallCtx;
    use vidstake_params::prelude::StakingParams;
    use vidstake_primitives::{Address, Amount};

    use super::*;
    use crate::inmemory::StakingDbInMemory;

    fn owner() -> Address {
        Address::from_low_u64(1)
    }

    fn transcoder() -> Address {
        Address::from_low_u64(10)
    }

    fn delegator() -> Address {
        Address::from_low_u64(20)
    }

    fn busy_ledger() -> StakingLedger {
        let mut ledger = StakingLedger::new(&StakingParams::default().with_owner(owner())).unwrap();
        let ctx = |caller, now| CallCtx::new(caller, now);

        ledger.register_transcoder(&ctx(transcoder(), 0), 3).unwrap();
        ledger
            .delegate(&ctx(transcoder(), 0), transcoder(), Amount::from_tokens(10))
            .unwrap();
        ledger
            .delegate(&ctx(delegator(), 1), transcoder(), Amount::from_tokens(8))
            .unwrap();
        ledger
            .request_unbonding(&ctx(delegator(), 6), transcoder(), Amount::from_tokens(2))
            .unwrap();
        ledger.add_manager(&ctx(owner(), 6), delegator()).unwrap();
        ledger.slash(&ctx(owner(), 7), transcoder()).unwrap();

        ledger
    }

    #[tokio::test]
    async fn test_empty_db_restores_nothing() {
        let db = StakingDbInMemory::default();
        assert!(restore_ledger(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ledger_round_trip() {
        let db = StakingDbInMemory::default();
        let ledger = busy_ledger();

        persist_ledger(&db, &ledger).await.unwrap();
        let restored = restore_ledger(&db).await.unwrap().unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(restored.slash_count(&transcoder()), 1);
        assert!(restored.access().is_manager(&delegator()));
    }

    #[tokio::test]
    async fn test_persist_drops_withdrawn_entries() {
        let db = StakingDbInMemory::default();
        let mut ledger = busy_ledger();
        persist_ledger(&db, &ledger).await.unwrap();

        let ctx = CallCtx::new(delegator(), 16);
        ledger.withdraw_pending(&ctx).unwrap();
        ledger
            .request_unbonding(&ctx, transcoder(), Amount::from_tokens(3))
            .unwrap();
        persist_ledger(&db, &ledger).await.unwrap();

        assert_eq!(
            db.list_delegations().await.unwrap(),
            vec![(transcoder(), transcoder())]
        );
        assert_eq!(restore_ledger(&db).await.unwrap().unwrap(), ledger);
    }
}
