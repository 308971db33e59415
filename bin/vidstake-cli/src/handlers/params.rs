use anyhow::{Context, Result};
use tracing::info;
use vidstake_params::prelude::StakingParams;
use vidstake_primitives::Address;

use crate::cli::{ParamsArgs, Preset};

pub(crate) fn handle_params(args: ParamsArgs) -> Result<()> {
    let ParamsArgs { preset, owner } = args;
    let owner = owner.unwrap_or(Address::ZERO);

    info!(%preset, %owner, "rendering parameters");

    println!("{}", render(&preset_params(preset, owner))?);

    Ok(())
}

fn preset_params(preset: Preset, owner: Address) -> StakingParams {
    match preset {
        Preset::Dev => StakingParams::default().with_owner(owner),
        Preset::Mainnet => StakingParams::mainnet(owner),
    }
}

fn render(params: &StakingParams) -> Result<String> {
    toml::to_string_pretty(params).context("failed to render parameters as TOML")
}
