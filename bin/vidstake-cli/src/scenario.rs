//! Recorded calls to replay against a ledger.

use serde::Deserialize;
use vidstake_ledger::{CallCtx, LedgerCall};
use vidstake_primitives::{Address, Amount, Timestamp};

/// A sequence of timed calls together with the funds the callers start with.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) funding: Vec<Funding>,

    #[serde(default)]
    pub(crate) steps: Vec<Step>,
}

/// Funds an account holds before the first step.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Funding {
    pub(crate) account: Address,
    pub(crate) amount: Amount,
}

/// One call made by `caller` at time `at`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Step {
    pub(crate) at: Timestamp,

    pub(crate) caller: Address,

    /// Whether the call is expected to be rejected.
    #[serde(default)]
    pub(crate) rejected: bool,

    #[serde(flatten)]
    pub(crate) call: LedgerCall,
}

impl Step {
    pub(crate) const fn ctx(&self) -> CallCtx {
        CallCtx::new(self.caller, self.at)
    }
}

impl Scenario {
    /// Returns the time of the last step.
    pub(crate) fn last_time(&self) -> Timestamp {
        self.steps.iter().map(|s| s.at).max().unwrap_or_default()
    }
}
