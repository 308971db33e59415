//! Parses command-line arguments for the staking CLI.

use std::{fmt::Display, path::PathBuf};

use clap::{crate_version, Parser, Subcommand, ValueEnum};
use vidstake_primitives::{Address, Timestamp};

#[derive(Debug, Parser)]
#[command(
    name = "vidstake-cli",
    about = "Inspect staking parameters and replay recorded calls against a staking ledger",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Replay(ReplayArgs),

    Params(ParamsArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Replay a scenario of timed calls and report the resulting ledger")]
pub(crate) struct ReplayArgs {
    #[arg(
        long,
        short = 'p',
        env = "VIDSTAKE_PARAMS",
        help = "the file containing the ledger parameters, the development parameters if omitted"
    )]
    pub(crate) params: Option<PathBuf>,

    #[arg(long, short = 's', help = "the file containing the scenario to replay")]
    pub(crate) scenario: PathBuf,

    #[arg(
        long,
        help = "the time at which to report transcoder states, the time of the last step if omitted"
    )]
    pub(crate) at: Option<Timestamp>,

    #[arg(long, short = 'o', help = "write the JSON report to this file instead of stdout")]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Print a parameter preset as TOML")]
pub(crate) struct ParamsArgs {
    #[arg(
        value_enum,
        help = "the deployment to print the parameters of",
        default_value_t = Preset::Dev
    )]
    pub(crate) preset: Preset,

    #[arg(long, help = "the owner of the ledger")]
    pub(crate) owner: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Preset {
    /// The development deployment with short periods and a 50% slash rate.
    Dev,

    /// The production deployment.
    #[value(alias = "main")]
    Mainnet,
}

impl Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Dev => write!(f, "dev"),
            Preset::Mainnet => write!(f, "mainnet"),
        }
    }
}
