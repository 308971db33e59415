//! CLI to inspect staking parameters and replay recorded calls against a staking ledger.

mod cli;
mod handlers;
mod report;
mod scenario;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use vidstake_common::logging::{self, LoggerConfig};

use crate::handlers::{params, replay};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = LoggerConfig::with_base_name("vidstake-cli");
    config.set_default_directive("warn");
    logging::init(config);

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Commands::Replay(args) => replay::handle_replay(args).await,
        cli::Commands::Params(args) => params::handle_params(args),
    }
}

/// Reads and parses a TOML file.
pub(crate) fn parse_toml<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?contents, "read file");

    let parsed = toml::from_str::<T>(&contents)
        .with_context(|| format!("failed to parse TOML file {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
