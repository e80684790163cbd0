//! # auctionhouse-settlement
//!
//! **Settlement plane**: listing creation, Dutch-auction purchase, and
//! proceeds withdrawal.
//!
//! ## Architecture
//!
//! The [`SettlementEngine`] owns the stores from `auctionhouse-book` and
//! drives them in checks-effects-interactions order:
//! 1. Validate every precondition (no state touched on failure)
//! 2. Consume the listing, credit the ledger, record conservation totals
//! 3. Call the external collaborator ([`ItemCustodian`] or [`FundsGateway`])
//! 4. If the collaborator fails, restore the exact prior state
//! 5. Append a [`MarketEvent`](auctionhouse_types::MarketEvent) to the journal
//!
//! Time is injected through [`Clock`]; every operation also has an `_at`
//! variant taking the clock reading explicitly.

pub mod clock;
pub mod collaborator;
pub mod conservation;
pub mod engine;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use collaborator::{FundsGateway, ItemCustodian};
pub use conservation::ProceedsConservation;
pub use engine::{ListingRequest, Settlement, SettlementEngine};
