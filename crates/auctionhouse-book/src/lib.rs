//! # auctionhouse-book
//!
//! In-memory stores owned by the settlement engine:
//! 1. **CollectionRegistry**: immutable set of accepted collections
//! 2. **AuctionBook**: at most one record per (collection, item)
//! 3. **ProceedsLedger**: withdrawable balance per account
//!
//! None of these stores call out to collaborators. Every mutation either
//! succeeds completely or leaves the store unchanged.

pub mod auction_book;
pub mod proceeds_ledger;
pub mod registry;

pub use auction_book::AuctionBook;
pub use proceeds_ledger::ProceedsLedger;
pub use registry::CollectionRegistry;
