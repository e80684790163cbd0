//! System-wide constants for the AuctionHouse engine.

/// Length of one price decay step, in seconds.
pub const DISCOUNT_INTERVAL_SECS: u64 = 300;

/// Price reduction per elapsed interval, in basis points of the starting price (5%).
pub const DISCOUNT_RATE_BPS: u128 = 500;

/// Basis-point denominator (100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Decimal places of the smallest currency unit (wei-style).
pub const AMOUNT_DECIMALS: u32 = 18;

/// One whole currency unit expressed in the smallest unit.
pub const ONE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Default maximum distance between listing time and deadline (180 days).
pub const DEFAULT_MAX_LISTING_HORIZON_SECS: u64 = 180 * 24 * 60 * 60;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "AuctionHouse";
