//! Unit tests for running calls through the staking service
#[cfg(test)]
mod tests {
    use std::error::Error;

    use vidstake_params::prelude::SnapshotTranscoder;

    use crate::{
        calls::LedgerCall,
        errors::LedgerError,
        ledger::StakingLedger,
        service::{InMemoryTreasury, ServiceError, StakingService, TreasuryError},
        tests::{
            APPROVED, GENESIS, UNBONDING_PERIOD, ctx, delegator, owner, slash_fund, test_ledger,
            test_params, tokens, transcoder,
        },
    };

    fn snapshot_ledger() -> StakingLedger {
        let params = test_params().with_snapshot(vec![SnapshotTranscoder {
            address: transcoder(),
            total: tokens(10),
            timestamp: GENESIS,
            reward_rate: 1,
            effective_min_self_stake: tokens(10),
        }]);

        StakingLedger::new(&params).unwrap()
    }

    fn funded_service() -> StakingService<InMemoryTreasury> {
        let mut treasury = InMemoryTreasury::new();
        treasury.fund(transcoder(), tokens(10)).unwrap();
        treasury.fund(delegator(), tokens(10)).unwrap();

        let mut service = StakingService::new(test_ledger(), treasury).unwrap();
        service
            .submit(
                &ctx(transcoder(), GENESIS),
                LedgerCall::RegisterTranscoder { reward_rate: 1 },
            )
            .unwrap();
        service
            .submit(
                &ctx(transcoder(), GENESIS),
                LedgerCall::Delegate {
                    transcoder: transcoder(),
                    value: tokens(10),
                },
            )
            .unwrap();
        service
    }

    #[test]
    fn test_attached_value_moves_into_reserve() {
        let service = funded_service();

        assert_eq!(service.treasury().balance_of(&transcoder()), tokens(0));
        assert_eq!(service.treasury().reserve(), tokens(10));
        assert_eq!(service.treasury().reserve(), service.ledger().escrow());
    }

    #[test]
    fn test_unfunded_call_is_rolled_back() {
        let mut service = funded_service();
        let before = service.ledger().clone();

        let err = service
            .submit(
                &ctx(delegator(), APPROVED),
                LedgerCall::Delegate {
                    transcoder: transcoder(),
                    value: tokens(11),
                },
            )
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Treasury(TreasuryError::InsufficientFunds {
                account: delegator(),
                available: tokens(10),
                required: tokens(11),
            })
        );
        assert_eq!(service.ledger(), &before);
        assert_eq!(service.treasury().balance_of(&delegator()), tokens(10));
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let mut service = funded_service();

        let err = service
            .submit(&ctx(delegator(), APPROVED), LedgerCall::WithdrawAllPending)
            .unwrap_err();

        assert_eq!(err, ServiceError::Ledger(LedgerError::NoPendingRequests));
    }

    #[test]
    fn test_slashed_withdrawal_pays_delegator_and_slash_fund() {
        let mut service = funded_service();
        let now = APPROVED;

        for (caller, call) in [
            (
                delegator(),
                LedgerCall::Delegate {
                    transcoder: transcoder(),
                    value: tokens(6),
                },
            ),
            (
                delegator(),
                LedgerCall::RequestUnbonding {
                    transcoder: transcoder(),
                    amount: tokens(6),
                },
            ),
            (
                owner(),
                LedgerCall::Slash {
                    transcoder: transcoder(),
                },
            ),
        ] {
            service.submit(&ctx(caller, now), call).unwrap();
        }

        service
            .submit(
                &ctx(delegator(), now + UNBONDING_PERIOD),
                LedgerCall::WithdrawPending { transcoder: None },
            )
            .unwrap();

        let treasury = service.treasury();
        assert_eq!(treasury.balance_of(&delegator()), tokens(7));
        assert_eq!(treasury.balance_of(&slash_fund()), tokens(8));
        assert_eq!(treasury.reserve(), tokens(5));
        assert_eq!(treasury.reserve(), service.ledger().escrow());
    }

    #[test]
    fn test_skipped_slash_moves_nothing() {
        let mut service = funded_service();

        let output = service
            .submit(
                &ctx(owner(), GENESIS),
                LedgerCall::Slash {
                    transcoder: transcoder(),
                },
            )
            .unwrap();

        assert!(!output.applied);
        assert_eq!(service.ledger().slash_count(&transcoder()), 0);
    }

    #[test]
    fn test_unbacked_escrow_is_refused() {
        let err = StakingService::new(snapshot_ledger(), InMemoryTreasury::new()).unwrap_err();

        assert_eq!(
            err,
            ServiceError::UnbackedEscrow {
                escrow: tokens(10),
                reserve: tokens(0),
            }
        );
    }

    #[test]
    fn test_snapshot_stake_is_withdrawable() {
        let ledger = snapshot_ledger();
        let mut treasury = InMemoryTreasury::new();
        treasury.fund_reserve(ledger.escrow()).unwrap();
        treasury.fund(delegator(), tokens(6)).unwrap();

        let mut service = StakingService::new(ledger, treasury).unwrap();
        assert_eq!(service.treasury().reserve(), tokens(10));

        let steps = [
            (
                ctx(delegator(), APPROVED),
                LedgerCall::Delegate {
                    transcoder: transcoder(),
                    value: tokens(6),
                },
            ),
            (
                ctx(transcoder(), APPROVED),
                LedgerCall::RequestUnbonding {
                    transcoder: transcoder(),
                    amount: tokens(10),
                },
            ),
            (
                ctx(transcoder(), APPROVED + UNBONDING_PERIOD),
                LedgerCall::WithdrawPending { transcoder: None },
            ),
        ];
        for (ctx, call) in steps {
            service.submit(&ctx, call).unwrap();
            assert_eq!(service.treasury().reserve(), service.ledger().escrow());
        }

        assert_eq!(service.treasury().balance_of(&transcoder()), tokens(10));
        assert_eq!(service.treasury().reserve(), tokens(6));
        assert_eq!(
            service.ledger().delegator_stake(&transcoder(), &delegator()),
            tokens(6)
        );
    }

    #[test]
    fn test_treasury_error_is_reported_once() {
        let err = ServiceError::from(TreasuryError::InsufficientReserve {
            available: tokens(0),
            required: tokens(10),
        });

        assert_eq!(err.to_string(), "treasury rejected transfers");
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("reserve holds 0 but 10000000000000000000 is required".to_string())
        );
    }
}
