//! Runs ledger calls as transactions against a treasury that holds the funds.
//!
//! The ledger only books stake. Moving value is left to a [`Treasury`]: the funds a caller
//! attaches to a call flow into the treasury's reserve, and the transfers the call emits flow out
//! of it. A call is committed only if the treasury accepts the whole batch.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};
use vidstake_primitives::{Address, Amount};

use crate::{
    calls::{CallCtx, LedgerCall},
    duties::{LedgerOutput, Transfer},
    errors::LedgerError,
    ledger::StakingLedger,
};

/// The funds moved by one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferBatch {
    /// The account that attached funds to the call.
    pub payer: Address,

    /// The funds attached to the call.
    pub incoming: Amount,

    /// The transfers out of the reserve.
    pub outgoing: Vec<Transfer>,
}

/// Errors a treasury can fail a batch with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryError {
    /// The payer cannot cover the funds attached to the call.
    #[error("{account} holds {available} but {required} is required")]
    InsufficientFunds {
        /// The payer.
        account: Address,
        /// The payer's balance.
        available: Amount,
        /// The attached funds.
        required: Amount,
    },

    /// The reserve cannot cover the outgoing transfers.
    #[error("reserve holds {available} but {required} is required")]
    InsufficientReserve {
        /// The reserve including the incoming funds.
        available: Amount,
        /// The sum of the outgoing transfers.
        required: Amount,
    },

    /// A balance left the representable range.
    #[error("arithmetic overflow while {0}")]
    Overflow(&'static str),
}

/// Holds the funds backing the ledger.
pub trait Treasury {
    /// Returns the funds held on behalf of the ledger.
    fn reserve(&self) -> Amount;

    /// Performs every movement of `batch` or none of them.
    fn settle(&mut self, batch: &TransferBatch) -> Result<(), TreasuryError>;
}

/// A treasury that keeps balances in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryTreasury {
    balances: BTreeMap<Address, Amount>,
    reserve: Amount,
}

impl InMemoryTreasury {
    /// Creates an empty treasury.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `account` out of thin air.
    pub fn fund(&mut self, account: Address, amount: Amount) -> Result<(), TreasuryError> {
        credit(&mut self.balances, account, amount)
    }

    /// Credits `amount` to the reserve out of thin air.
    ///
    /// Used to back the escrow a ledger starts with, such as the stake of snapshot transcoders.
    pub fn fund_reserve(&mut self, amount: Amount) -> Result<(), TreasuryError> {
        self.reserve = self
            .reserve
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow("crediting the reserve"))?;
        Ok(())
    }

    /// Returns the balance of `account`.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Returns the funds held on behalf of the ledger.
    pub const fn reserve(&self) -> Amount {
        self.reserve
    }
}

fn credit(
    balances: &mut BTreeMap<Address, Amount>,
    account: Address,
    amount: Amount,
) -> Result<(), TreasuryError> {
    let balance = balances.entry(account).or_default();
    *balance = balance
        .checked_add(amount)
        .ok_or(TreasuryError::Overflow("crediting an account"))?;
    Ok(())
}

impl Treasury for InMemoryTreasury {
    fn reserve(&self) -> Amount {
        self.reserve
    }

    fn settle(&mut self, batch: &TransferBatch) -> Result<(), TreasuryError> {
        let mut balances = self.balances.clone();

        let available = balances.get(&batch.payer).copied().unwrap_or_default();
        let remaining =
            available
                .checked_sub(batch.incoming)
                .ok_or(TreasuryError::InsufficientFunds {
                    account: batch.payer,
                    available,
                    required: batch.incoming,
                })?;
        if !batch.incoming.is_zero() {
            balances.insert(batch.payer, remaining);
        }

        let reserve = self
            .reserve
            .checked_add(batch.incoming)
            .ok_or(TreasuryError::Overflow("crediting the reserve"))?;
        let required = batch.outgoing.iter().try_fold(Amount::ZERO, |acc, t| {
            acc.checked_add(t.amount)
                .ok_or(TreasuryError::Overflow("summing transfers"))
        })?;
        let reserve = reserve
            .checked_sub(required)
            .ok_or(TreasuryError::InsufficientReserve {
                available: reserve,
                required,
            })?;

        for transfer in &batch.outgoing {
            credit(&mut balances, transfer.to, transfer.amount)?;
        }

        self.balances = balances;
        self.reserve = reserve;

        Ok(())
    }
}

/// Errors that can occur while running a call through the [`StakingService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The ledger rejected the call.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The treasury rejected the funds movement of the call.
    #[error("treasury rejected transfers")]
    Treasury(#[from] TreasuryError),

    /// The treasury reserve does not cover the escrow the ledger holds.
    #[error("escrow of {escrow} is backed by a reserve of only {reserve}")]
    UnbackedEscrow {
        /// The funds the ledger holds.
        escrow: Amount,
        /// The funds the treasury holds for the ledger.
        reserve: Amount,
    },
}

/// The result type for calls run through the [`StakingService`].
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Runs calls against a ledger and settles their funds with a treasury.
///
/// Holding the ledger by `&mut` makes every call run to completion before the next one starts.
#[derive(Debug, Clone)]
pub struct StakingService<T> {
    ledger: StakingLedger,
    treasury: T,
}

impl<T: Treasury> StakingService<T> {
    /// Creates a service over `ledger` backed by `treasury`.
    ///
    /// Fails if the treasury reserve cannot cover the ledger's escrow.
    pub fn new(ledger: StakingLedger, treasury: T) -> ServiceResult<Self> {
        let escrow = ledger.escrow();
        let reserve = treasury.reserve();
        if reserve < escrow {
            return Err(ServiceError::UnbackedEscrow { escrow, reserve });
        }

        Ok(Self { ledger, treasury })
    }

    /// Returns the ledger.
    pub const fn ledger(&self) -> &StakingLedger {
        &self.ledger
    }

    /// Returns the treasury.
    pub const fn treasury(&self) -> &T {
        &self.treasury
    }

    /// Splits the service into its ledger and treasury.
    pub fn into_parts(self) -> (StakingLedger, T) {
        (self.ledger, self.treasury)
    }

    /// Applies `call` and settles its funds.
    ///
    /// The funds attached to the call are collected only if the call changed the ledger. If the
    /// treasury rejects the batch, the ledger is restored to its state before the call.
    pub fn submit(&mut self, ctx: &CallCtx, call: LedgerCall) -> ServiceResult<LedgerOutput> {
        let name = call.name();
        let attached = call.attached_value();
        let previous = self.ledger.clone();

        let output = self.ledger.process_call(ctx, call)?;

        let batch = TransferBatch {
            payer: ctx.caller,
            incoming: if output.applied {
                attached
            } else {
                Amount::ZERO
            },
            outgoing: output.transfers().copied().collect(),
        };

        if let Err(err) = self.treasury.settle(&batch) {
            warn!(call = name, caller = %ctx.caller, %err, "rolling back call");
            self.ledger = previous;
            return Err(err.into());
        }

        debug!(
            call = name,
            caller = %ctx.caller,
            incoming = %batch.incoming,
            transfers = batch.outgoing.len(),
            "call committed"
        );

        Ok(output)
    }
}
