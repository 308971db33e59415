//! Derivation of a transcoder's lifecycle phase.

use vidstake_primitives::{Amount, Timestamp, TranscoderState};

use crate::{config::LedgerConfig, records::Transcoder, unbonding::UnbondingQueue};

/// Derives the lifecycle phase of `transcoder` at `now`.
///
/// `own_unbonding` holds the unbonding requests the transcoder filed against itself. The phase is
/// recomputed on every call, so raising the minimum self stake demotes bonded transcoders right
/// away.
pub fn transcoder_state(
    transcoder: &Transcoder,
    own_unbonding: Option<&UnbondingQueue>,
    config: &LedgerConfig,
    now: Timestamp,
) -> TranscoderState {
    let Some(registered_at) = transcoder.registered_at else {
        return TranscoderState::Unbonded;
    };

    if now.saturating_sub(registered_at) < config.approval_period {
        return TranscoderState::Bonding;
    }

    if transcoder.jailed {
        return TranscoderState::Unbonded;
    }

    if transcoder.normalized_self_stake(config.slash_rate) < min_self_stake(transcoder, config) {
        let unbonding = own_unbonding.is_some_and(|queue| queue.has_unmatured(now));
        return if unbonding {
            TranscoderState::Unbonding
        } else {
            TranscoderState::Unbonded
        };
    }

    TranscoderState::Bonded
}

/// Returns the self-stake minimum `transcoder` is judged against.
pub fn min_self_stake(transcoder: &Transcoder, config: &LedgerConfig) -> Amount {
    transcoder
        .effective_min_self_stake
        .unwrap_or(config.min_self_stake)
}

#[cfg(test)]
mod tests {
    use vidstake_params::prelude::StakingParams;

    use super::*;
    use crate::unbonding::UnbondingRequest;

    fn config() -> LedgerConfig {
        LedgerConfig::from(&StakingParams::default())
    }

    fn bonded_candidate() -> Transcoder {
        Transcoder {
            self_stake: Amount::from_tokens(10),
            total_stake: Amount::from_tokens(10),
            ..Transcoder::registered(0, 10)
        }
    }

    #[test]
    fn bonding_during_approval_period() {
        let transcoder = bonded_candidate();
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 4),
            TranscoderState::Bonding
        );
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 5),
            TranscoderState::Bonded
        );
    }

    #[test]
    fn bonding_takes_precedence_over_jail() {
        let transcoder = Transcoder {
            jailed: true,
            ..bonded_candidate()
        };
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 0),
            TranscoderState::Bonding
        );
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 5),
            TranscoderState::Unbonded
        );
    }

    #[test]
    fn below_minimum_is_unbonding_only_while_own_request_waits() {
        let transcoder = Transcoder {
            self_stake: Amount::from_tokens(8),
            total_stake: Amount::from_tokens(8),
            ..Transcoder::registered(0, 10)
        };
        let mut queue = UnbondingQueue::default();
        queue.push(UnbondingRequest::new(Amount::from_tokens(2), 0, 15));

        assert_eq!(
            transcoder_state(&transcoder, Some(&queue), &config(), 5),
            TranscoderState::Unbonding
        );
        assert_eq!(
            transcoder_state(&transcoder, Some(&queue), &config(), 15),
            TranscoderState::Unbonded
        );
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 5),
            TranscoderState::Unbonded
        );
    }

    #[test]
    fn raising_minimum_demotes() {
        let transcoder = bonded_candidate();
        let mut config = config();
        assert_eq!(
            transcoder_state(&transcoder, None, &config, 5),
            TranscoderState::Bonded
        );

        config.min_self_stake = Amount::from_tokens(11);
        assert_eq!(
            transcoder_state(&transcoder, None, &config, 5),
            TranscoderState::Unbonded
        );
    }

    #[test]
    fn pending_slash_counts_against_self_stake() {
        let transcoder = Transcoder {
            slash_count: 1,
            ..bonded_candidate()
        };
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 5),
            TranscoderState::Unbonded
        );
    }

    #[test]
    fn effective_minimum_overrides_global() {
        let transcoder = Transcoder {
            effective_min_self_stake: Some(Amount::from_tokens(1)),
            self_stake: Amount::from_tokens(2),
            total_stake: Amount::from_tokens(2),
            ..Transcoder::registered(0, 10)
        };
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 5),
            TranscoderState::Bonded
        );
    }

    #[test]
    fn unregistered_is_unbonded() {
        let transcoder = Transcoder {
            total_stake: Amount::from_tokens(6),
            ..Default::default()
        };
        assert_eq!(
            transcoder_state(&transcoder, None, &config(), 100),
            TranscoderState::Unbonded
        );
    }
}
