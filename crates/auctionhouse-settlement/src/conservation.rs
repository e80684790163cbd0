//! Proceeds conservation invariant checker.
//!
//! ```text
//! Σ(ledger balances) == Σ(payments received) - Σ(payouts)
//! ```
//!
//! Purchases credit exactly what the buyer paid (split between seller and
//! refund), and withdrawals debit exactly what is paid out, so the two
//! sides must always agree.

use auctionhouse_types::{Amount, MarketError, Result};

/// Running totals of value entering and leaving the engine.
#[derive(Debug, Default)]
pub struct ProceedsConservation {
    received: Amount,
    paid_out: Amount,
}

impl ProceedsConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a payment taken in by a purchase.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the running total would overflow.
    pub fn record_received(&mut self, amount: Amount) -> Result<()> {
        self.received = self
            .received
            .checked_add(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Undo a [`record_received`](Self::record_received) on rollback.
    pub fn revert_received(&mut self, amount: Amount) {
        self.received = self.received.saturating_sub(amount);
    }

    /// Record value released through the funds gateway.
    pub fn record_paid_out(&mut self, amount: Amount) {
        self.paid_out = self.paid_out.saturating_add(amount);
    }

    /// Undo a [`record_paid_out`](Self::record_paid_out) on rollback.
    pub fn revert_paid_out(&mut self, amount: Amount) {
        self.paid_out = self.paid_out.saturating_sub(amount);
    }

    /// Value that should currently sit in the ledger.
    #[must_use]
    pub fn expected(&self) -> Amount {
        self.received.saturating_sub(self.paid_out)
    }

    /// Total value received from buyers.
    #[must_use]
    pub fn total_received(&self) -> Amount {
        self.received
    }

    /// Total value paid out to accounts.
    #[must_use]
    pub fn total_paid_out(&self) -> Amount {
        self.paid_out
    }

    /// Verify the ledger total against the running totals.
    ///
    /// # Errors
    /// Returns [`MarketError::ProceedsInvariantViolation`] if they differ.
    pub fn verify(&self, ledger_total: Amount) -> Result<()> {
        let expected = self.expected();
        if ledger_total != expected {
            return Err(MarketError::ProceedsInvariantViolation {
                reason: format!(
                    "ledger total {ledger_total} != expected {expected} \
                     (received={}, paid_out={})",
                    self.received, self.paid_out
                ),
            });
        }
        Ok(())
    }
}
