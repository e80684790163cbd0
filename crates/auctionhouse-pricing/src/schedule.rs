//! Decay schedule helpers for countdown displays.
//!
//! Prices only change on interval boundaries, and after at most
//! `BPS_DENOMINATOR / DISCOUNT_RATE_BPS` intervals the price is pinned to
//! the reserve, so both helpers scan a small bounded range.

use auctionhouse_types::constants::{BPS_DENOMINATOR, DISCOUNT_INTERVAL_SECS, DISCOUNT_RATE_BPS};
use auctionhouse_types::{AuctionRecord, Timestamp};

use crate::oracle::{PriceOracle, elapsed_intervals};

/// Intervals after which the raw price is zero.
const MAX_INTERVALS: u64 = (BPS_DENOMINATOR / DISCOUNT_RATE_BPS) as u64;

fn boundary(listing_time: Timestamp, intervals: u64) -> Timestamp {
    listing_time.saturating_add(intervals.saturating_mul(DISCOUNT_INTERVAL_SECS))
}

/// The next instant after `now` at which the listing's price strictly drops.
///
/// `None` once the price has reached the reserve floor.
#[must_use]
pub fn next_price_drop(record: &AuctionRecord, now: Timestamp) -> Option<Timestamp> {
    let current = PriceOracle::price_of(record, now);
    if current == record.reserve_price {
        return None;
    }
    let start = elapsed_intervals(record.listing_time, now) + 1;
    (start..=MAX_INTERVALS)
        .map(|k| boundary(record.listing_time, k))
        .find(|&t| PriceOracle::price_of(record, t) < current)
}

/// The first instant at which the listing's price equals its reserve.
#[must_use]
pub fn reserve_reached_at(record: &AuctionRecord) -> Timestamp {
    (0..=MAX_INTERVALS)
        .map(|k| boundary(record.listing_time, k))
        .find(|&t| PriceOracle::price_of(record, t) == record.reserve_price)
        .unwrap_or_else(|| boundary(record.listing_time, MAX_INTERVALS))
}
