use std::{collections::BTreeSet, fs};

use anyhow::{bail, ensure, Context, Result};
use tracing::{debug, info};
use vidstake_db::{
    inmemory::StakingDbInMemory,
    ledger::{persist_ledger, restore_ledger},
};
use vidstake_ledger::{
    service::{InMemoryTreasury, StakingService},
    StakingLedger,
};
use vidstake_params::prelude::StakingParams;
use vidstake_primitives::Timestamp;

use crate::{cli::ReplayArgs, parse_toml, report::Report, scenario::Scenario};

pub(crate) async fn handle_replay(args: ReplayArgs) -> Result<()> {
    let ReplayArgs {
        params,
        scenario,
        at,
        out,
    } = args;

    let params = match params {
        Some(path) => parse_toml::<StakingParams>(path)?,
        None => StakingParams::default(),
    };
    let scenario = parse_toml::<Scenario>(scenario)?;

    let report = replay(&params, &scenario, at).await?;
    let json = serde_json::to_string_pretty(&report).context("failed to render report")?;

    match out {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

/// Runs every step of `scenario` against a fresh ledger and reports the outcome at `at`.
pub(crate) async fn replay(
    params: &StakingParams,
    scenario: &Scenario,
    at: Option<Timestamp>,
) -> Result<Report> {
    let ledger = StakingLedger::new(params).context("failed to build ledger")?;

    let mut treasury = InMemoryTreasury::new();
    treasury
        .fund_reserve(ledger.escrow())
        .context("failed to back the snapshot escrow")?;
    for funding in &scenario.funding {
        treasury
            .fund(funding.account, funding.amount)
            .with_context(|| format!("failed to fund {}", funding.account))?;
    }

    let mut accounts: BTreeSet<_> = scenario.funding.iter().map(|f| f.account).collect();
    accounts.insert(params.slash_fund);

    let mut service = StakingService::new(ledger, treasury)?;
    let mut rejected = 0;
    let mut clock = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        let name = step.call.name();
        if step.at < clock {
            bail!("step {index} ({name}) at {} goes back in time from {clock}", step.at);
        }
        clock = step.at;
        accounts.insert(step.caller);

        match service.submit(&step.ctx(), step.call.clone()) {
            Ok(_) if step.rejected => {
                bail!("step {index} ({name}) was expected to be rejected");
            }
            Ok(output) => {
                debug!(index, call = name, applied = output.applied, "step applied");
            }
            Err(err) if step.rejected => {
                info!(index, call = name, %err, "step rejected as expected");
                rejected += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("step {index} ({name}) failed"));
            }
        }
    }

    let (ledger, treasury) = service.into_parts();

    let db = StakingDbInMemory::default();
    persist_ledger(&db, &ledger).await?;
    let restored = restore_ledger(&db)
        .await?
        .context("no ledger was persisted")?;
    ensure!(
        restored == ledger,
        "restored ledger differs from the replayed one"
    );

    let at = at.unwrap_or_else(|| scenario.last_time());
    info!(steps = scenario.steps.len(), rejected, at, "replay finished");

    Ok(Report::new(
        &restored,
        &treasury,
        &accounts,
        at,
        scenario.steps.len(),
        rejected,
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use vidstake_params::prelude::SnapshotTranscoder;
    use vidstake_primitives::{Address, Amount, TranscoderState};

    use super::*;
    use crate::cli::ReplayArgs;

    const TRANSCODER: &str = "0x000000000000000000000000000000000000000a";
    const DELEGATOR: &str = "0x0000000000000000000000000000000000000014";

    fn parse_scenario(body: &str) -> Scenario {
        toml::from_str(&body.replace("$T", TRANSCODER).replace("$D", DELEGATOR)).unwrap()
    }

    fn params() -> StakingParams {
        StakingParams::default().with_owner(Address::from_low_u64(1))
    }

    #[tokio::test]
    async fn test_slash_is_realized_on_next_touch() {
        let scenario = parse_scenario(
            r#"
            [[funding]]
            account = "$T"
            amount = "20000000000000000000"

            [[steps]]
            at = 0
            caller = "$T"
            call = "register_transcoder"
            reward_rate = 1

            [[steps]]
            at = 5
            caller = "$T"
            call = "delegate"
            transcoder = "$T"
            value = "10000000000000000000"

            [[steps]]
            at = 6
            caller = "0x0000000000000000000000000000000000000001"
            call = "slash"
            transcoder = "$T"

            [[steps]]
            at = 7
            caller = "$T"
            call = "delegate"
            transcoder = "$T"
            value = 0
            rejected = true

            [[steps]]
            at = 7
            caller = "$T"
            call = "delegate"
            transcoder = "$T"
            value = 1
            "#,
        );

        let report = replay(&params(), &scenario, None).await.unwrap();

        let transcoder = &report.transcoders[0];
        assert_eq!(transcoder.slash_count, 1);
        assert!(transcoder.jailed);
        assert_eq!(transcoder.state, TranscoderState::Unbonded);
        assert_eq!(
            transcoder.settled_total_stake,
            Amount::from_units(5_000_000_000_000_000_001)
        );
        assert_eq!(report.rejected, 1);
        assert_eq!(report.balances[&Address::ZERO], Amount::from_tokens(5));
        assert_eq!(report.reserve, report.escrow);
    }

    #[tokio::test]
    async fn test_unbonding_round_trip() {
        let scenario = parse_scenario(
            r#"
            [[funding]]
            account = "$D"
            amount = "6000000000000000000"

            [[steps]]
            at = 0
            caller = "$D"
            call = "delegate"
            transcoder = "$T"
            value = "6000000000000000000"

            [[steps]]
            at = 0
            caller = "$D"
            call = "request_unbonding"
            transcoder = "$T"
            amount = "3000000000000000000"

            [[steps]]
            at = 10
            caller = "$D"
            call = "withdraw_pending"

            [[steps]]
            at = 10
            caller = "$D"
            call = "withdraw_pending"
            rejected = true
            "#,
        );

        let report = replay(&params(), &scenario, Some(10)).await.unwrap();

        let delegator: Address = DELEGATOR.parse().unwrap();
        assert_eq!(report.balances[&delegator], Amount::from_tokens(3));
        assert_eq!(report.escrow, Amount::from_tokens(3));
        assert!(report.transcoders.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_stake_is_paid_from_reserve() {
        let params = params().with_snapshot(vec![SnapshotTranscoder {
            address: TRANSCODER.parse().unwrap(),
            total: Amount::from_tokens(10),
            timestamp: 0,
            reward_rate: 1,
            effective_min_self_stake: Amount::from_tokens(10),
        }]);
        let scenario = parse_scenario(
            r#"
            [[funding]]
            account = "$D"
            amount = "6000000000000000000"

            [[steps]]
            at = 5
            caller = "$D"
            call = "delegate"
            transcoder = "$T"
            value = "6000000000000000000"

            [[steps]]
            at = 5
            caller = "$T"
            call = "request_unbonding"
            transcoder = "$T"
            amount = "10000000000000000000"

            [[steps]]
            at = 20
            caller = "$T"
            call = "withdraw_pending"
            "#,
        );

        let report = replay(&params, &scenario, None).await.unwrap();

        let transcoder: Address = TRANSCODER.parse().unwrap();
        assert_eq!(report.balances[&transcoder], Amount::from_tokens(10));
        assert_eq!(report.escrow, Amount::from_tokens(6));
        assert_eq!(report.reserve, report.escrow);
    }

    #[tokio::test]
    async fn test_unexpected_rejection_fails_replay() {
        let scenario = parse_scenario(
            r#"
            [[steps]]
            at = 0
            caller = "$D"
            call = "withdraw_all_pending"
            "#,
        );

        let err = replay(&params(), &scenario, None).await.unwrap_err();

        assert!(err.to_string().contains("step 0 (withdraw_all_pending) failed"));
    }

    #[tokio::test]
    async fn test_steps_must_be_chronological() {
        let scenario = parse_scenario(
            r#"
            [[steps]]
            at = 5
            caller = "$T"
            call = "register_transcoder"
            reward_rate = 1

            [[steps]]
            at = 4
            caller = "$D"
            call = "withdraw_all_pending"
            "#,
        );

        assert!(replay(&params(), &scenario, None).await.is_err());
    }

    #[tokio::test]
    async fn test_handle_replay_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let scenario_path = dir.path().join("scenario.toml");
        let out_path = dir.path().join("report.json");

        let mut file = fs::File::create(&scenario_path).unwrap();
        write!(
            file,
            r#"
            [[steps]]
            at = 0
            caller = "{TRANSCODER}"
            call = "register_transcoder"
            reward_rate = 1
            "#
        )
        .unwrap();

        handle_replay(ReplayArgs {
            params: None,
            scenario: scenario_path,
            at: Some(2),
            out: Some(out_path.clone()),
        })
        .await
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_path).unwrap()).unwrap();
        assert_eq!(report["transcoders"][0]["state"], "BONDING");
        assert_eq!(report["transcoders"][0]["address"], TRANSCODER);
        assert_eq!(report["steps"], 1);
    }
}
