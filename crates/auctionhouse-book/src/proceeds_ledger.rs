//! Withdrawable balances per account.
//!
//! Credits come from settled purchases (and refunded overpayments); debits
//! from withdrawals. Entries are never deleted and may sit at zero.

use std::collections::HashMap;

use auctionhouse_types::{AccountId, Amount, MarketError, Result};

/// The source of truth for withdrawable value.
#[derive(Debug, Default)]
pub struct ProceedsLedger {
    balances: HashMap<AccountId, Amount>,
}

impl ProceedsLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`; zero for unknown accounts.
    #[must_use]
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Increase the balance of `account`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would exceed `u128::MAX`;
    /// the balance is unchanged.
    pub fn credit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Decrease the balance of `account`.
    ///
    /// # Errors
    /// Returns `InsufficientProceeds` if the balance is below `amount`;
    /// the balance is unchanged.
    pub fn debit(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let available = self.balance(&account);
        if available < amount {
            return Err(MarketError::InsufficientProceeds {
                requested: amount,
                available,
            });
        }
        self.balances.insert(account, available - amount);
        Ok(())
    }

    /// Undo a [`credit`](Self::credit) made earlier in the same operation.
    pub fn reverse_credit(&mut self, account: AccountId, amount: Amount) {
        if let Some(entry) = self.balances.get_mut(&account) {
            *entry = entry.saturating_sub(amount);
        }
    }

    /// Undo a [`debit`](Self::debit) made earlier in the same operation.
    pub fn reverse_debit(&mut self, account: AccountId, amount: Amount) {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Sum of all balances.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the sum exceeds `u128::MAX`.
    pub fn total(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
            .ok_or(MarketError::ArithmeticOverflow)
    }

    /// Number of accounts that ever held a balance.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Returns `true` if no account has ever been credited.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
