//! Unit tests for register_transcoder and the lifecycle it starts.
#[cfg(test)]
mod tests {
    use vidstake_primitives::TranscoderState;

    use crate::{
        errors::LedgerError,
        tests::{
            APPROVED, GENESIS, ctx, delegator, other_transcoder, test_ledger, tokens, transcoder,
        },
    };

    #[test]
    fn test_register_starts_bonding() {
        let mut ledger = test_ledger();
        ledger
            .register_transcoder(&ctx(transcoder(), GENESIS), 7)
            .unwrap();

        let record = ledger.transcoder(&transcoder()).unwrap();
        assert_eq!(record.registered_at, Some(GENESIS));
        assert_eq!(record.reward_rate, 7);
        assert_eq!(
            ledger.transcoder_state(&transcoder(), GENESIS),
            TranscoderState::Bonding
        );
        assert_eq!(
            ledger.transcoder_state(&transcoder(), APPROVED - 1),
            TranscoderState::Bonding
        );
    }

    #[test]
    fn test_register_twice_fails() {
        let mut ledger = test_ledger();
        ledger
            .register_transcoder(&ctx(transcoder(), GENESIS), 7)
            .unwrap();
        let before = ledger.clone();

        let err = ledger
            .register_transcoder(&ctx(transcoder(), GENESIS + 1), 9)
            .unwrap_err();

        assert_eq!(err, LedgerError::AlreadyRegistered(transcoder()));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_unbonded_after_approval_without_self_stake() {
        let mut ledger = test_ledger();
        ledger
            .register_transcoder(&ctx(transcoder(), GENESIS), 7)
            .unwrap();

        assert_eq!(
            ledger.transcoder_state(&transcoder(), APPROVED),
            TranscoderState::Unbonded
        );

        ledger
            .delegate(&ctx(transcoder(), APPROVED), transcoder(), tokens(10))
            .unwrap();

        assert_eq!(
            ledger.transcoder_state(&transcoder(), APPROVED),
            TranscoderState::Bonded
        );
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut ledger = test_ledger();
        ledger
            .register_transcoder(&ctx(other_transcoder(), GENESIS), 1)
            .unwrap();
        ledger
            .register_transcoder(&ctx(transcoder(), GENESIS + 1), 1)
            .unwrap();

        assert_eq!(ledger.transcoders_count(), 2);
        assert_eq!(ledger.transcoder_at(0), Some(other_transcoder()));
        assert_eq!(ledger.transcoder_at(1), Some(transcoder()));
        assert_eq!(ledger.transcoder_at(2), None);
        assert_eq!(ledger.transcoders(), &[other_transcoder(), transcoder()]);
    }

    #[test]
    fn test_register_keeps_stake_delegated_before() {
        let mut ledger = test_ledger();
        ledger
            .delegate(&ctx(delegator(), GENESIS), transcoder(), tokens(6))
            .unwrap();

        assert_eq!(
            ledger.transcoder_state(&transcoder(), GENESIS),
            TranscoderState::Unbonded
        );
        assert_eq!(ledger.transcoders_count(), 0);

        ledger
            .register_transcoder(&ctx(transcoder(), GENESIS), 7)
            .unwrap();

        assert_eq!(ledger.total_stake(&transcoder()), tokens(6));
        assert_eq!(ledger.delegator_stake(&transcoder(), &delegator()), tokens(6));
        assert_eq!(ledger.transcoders_count(), 1);
    }

    #[test]
    fn test_unknown_address_is_unbonded() {
        let ledger = test_ledger();
        assert_eq!(
            ledger.transcoder_state(&transcoder(), GENESIS),
            TranscoderState::Unbonded
        );
        assert_eq!(ledger.total_stake(&transcoder()), tokens(0));
        assert_eq!(ledger.slash_count(&transcoder()), 0);
        assert!(!ledger.is_jailed(&transcoder()));
    }

    #[test]
    fn test_version_matches_crate() {
        assert_eq!(test_ledger().version(), env!("CARGO_PKG_VERSION"));
    }
}
