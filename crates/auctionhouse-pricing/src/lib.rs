//! # auctionhouse-pricing
//!
//! **Pure deterministic Dutch-auction pricing for AuctionHouse.**
//!
//! The price oracle takes listing parameters and a clock reading and
//! returns the current price. It has:
//!
//! - **Zero side effects**: safe to call for any past or future instant
//! - **Integer-exact output**: basis-point arithmetic, no floating point, so
//!   every implementation produces bit-identical prices
//! - **Step decay**: 5% of the starting price per elapsed 300s interval,
//!   floored at the reserve price

pub mod oracle;
pub mod schedule;

pub use oracle::{PriceOracle, discount_for, elapsed_intervals};
pub use schedule::{next_price_drop, reserve_reached_at};
