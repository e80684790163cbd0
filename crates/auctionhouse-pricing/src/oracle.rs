//! The Dutch-auction price function.
//!
//! ```text
//! intervals = floor(max(now - listing_time, 0) / DISCOUNT_INTERVAL)
//! raw       = starting - floor(starting * intervals * RATE_BPS / 10_000)
//! price     = max(reserve, raw)
//! ```

use auctionhouse_types::constants::{BPS_DENOMINATOR, DISCOUNT_INTERVAL_SECS, DISCOUNT_RATE_BPS};
use auctionhouse_types::{Amount, AuctionRecord, Timestamp};

/// Whole decay intervals elapsed since listing. Zero before the listing time.
#[must_use]
pub fn elapsed_intervals(listing_time: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(listing_time) / DISCOUNT_INTERVAL_SECS
}

/// Total discount after `intervals` steps, or `None` once the discount
/// reaches or exceeds the whole starting price.
///
/// Computes `floor(starting * bps / 10_000)` without overflowing `u128` by
/// splitting `starting` into quotient and remainder of the denominator.
#[must_use]
pub fn discount_for(starting_price: Amount, intervals: u64) -> Option<Amount> {
    let total_bps = u128::from(intervals).saturating_mul(DISCOUNT_RATE_BPS);
    if total_bps >= BPS_DENOMINATOR {
        return None;
    }
    let whole = (starting_price / BPS_DENOMINATOR) * total_bps;
    let part = (starting_price % BPS_DENOMINATOR) * total_bps / BPS_DENOMINATOR;
    Some(whole + part)
}

/// Stateless price oracle.
pub struct PriceOracle;

impl PriceOracle {
    /// Current price for the given listing parameters.
    ///
    /// Non-increasing in `now`, equal to `starting_price` at
    /// `now <= listing_time`, never below `reserve_price`.
    #[must_use]
    pub fn price(
        starting_price: Amount,
        reserve_price: Amount,
        listing_time: Timestamp,
        now: Timestamp,
    ) -> Amount {
        let intervals = elapsed_intervals(listing_time, now);
        match discount_for(starting_price, intervals) {
            Some(discount) => (starting_price - discount).max(reserve_price),
            None => reserve_price,
        }
    }

    /// Current price of a stored listing.
    #[must_use]
    pub fn price_of(record: &AuctionRecord, now: Timestamp) -> Amount {
        Self::price(
            record.starting_price,
            record.reserve_price,
            record.listing_time,
            now,
        )
    }
}
