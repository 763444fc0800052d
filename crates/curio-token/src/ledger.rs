//! Payment rails consumed by the marketplace.
//!
//! The marketplace never talks to a real payment backend directly; it is
//! polymorphic over the [`Ledger`] capability. [`InMemoryLedger`] is a
//! self-contained backend for hosts and tests.

use crate::amount::Amount;
use crate::error::{Result, TokenError};
use crate::wallet::Address;
use std::collections::HashMap;
use tracing::{debug, info};

/// Account balance store supporting value movement between accounts.
///
/// A debit can be rejected (insufficient balance); a credit can be rejected
/// only on balance overflow. Implementations must apply each call fully or
/// not at all; the settlement engine relies on that to unwind partially
/// settled operations.
pub trait Ledger {
    /// Add `amount` to `account`'s balance.
    ///
    /// # Errors
    ///
    /// Returns error if the credit would overflow the account balance.
    fn credit(&mut self, account: &Address, amount: Amount) -> Result<()>;

    /// Remove `amount` from `account`'s balance.
    ///
    /// # Errors
    ///
    /// Returns error if the account holds less than `amount`.
    fn debit(&mut self, account: &Address, amount: Amount) -> Result<()>;

    /// Current balance of `account` (zero for unknown accounts).
    fn balance(&self, account: &Address) -> Amount;
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: HashMap<Address, Amount>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with an initial balance (test/host bootstrap).
    ///
    /// # Errors
    ///
    /// Returns error if the deposit would overflow the account balance.
    pub fn deposit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        self.credit(account, amount)?;
        info!(account = %account, amount = %amount, "deposit completed");
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn credit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        let balance = self.accounts.entry(account.clone()).or_insert(Amount::ZERO);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TokenError::BalanceOverflow {
                account: account.to_string(),
                amount: amount.units(),
            })?;
        debug!(account = %account, amount = %amount, "credit applied");
        Ok(())
    }

    fn debit(&mut self, account: &Address, amount: Amount) -> Result<()> {
        let balance = self.accounts.entry(account.clone()).or_insert(Amount::ZERO);
        *balance = balance
            .checked_sub(amount)
            .ok_or_else(|| TokenError::insufficient_balance(balance.units(), amount.units()))?;
        debug!(account = %account, amount = %amount, "debit applied");
        Ok(())
    }

    fn balance(&self, account: &Address) -> Amount {
        self.accounts
            .get(account)
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}
