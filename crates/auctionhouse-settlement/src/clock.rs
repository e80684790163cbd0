//! Clock readings injected into the engine.

use auctionhouse_types::Timestamp;

/// Source of the current time for operations that do not take `now`
/// explicitly.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in whole seconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}
