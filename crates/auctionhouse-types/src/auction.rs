//! The auction record: one live Dutch-auction listing.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  purchase   ┌───────────┐
//!   │ LISTED ├────────────▶│ PURCHASED │  (record deleted)
//!   └───┬────┘             └───────────┘
//!       │ now > deadline
//!       ▼
//!   ┌─────────┐
//!   │ EXPIRED │  (record kept, not purchasable, replaceable by a new listing)
//!   └─────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AuctionId, CollectionId, ItemId, ListingKey, Timestamp};

/// Where a stored listing sits relative to a clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Purchasable at the current decayed price.
    Listed,
    /// Past its deadline. Not purchasable; a new listing for the same key replaces it.
    Expired,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listed => write!(f, "LISTED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A Dutch-auction listing for one item.
///
/// Owned exclusively by the auction book; callers only ever see shared
/// references or clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRecord {
    /// Identifier reported to indexers.
    pub auction_id: AuctionId,
    /// Owner of the item at listing time; receives the proceeds.
    pub seller: AccountId,
    /// Collection the item belongs to.
    pub collection: CollectionId,
    /// Token id within the collection.
    pub item_id: ItemId,
    /// Price at `listing_time`.
    #[serde(with = "crate::amount::amount_str")]
    pub starting_price: Amount,
    /// Floor the decaying price never goes below. Always > 0.
    #[serde(with = "crate::amount::amount_str")]
    pub reserve_price: Amount,
    /// Clock reading when the listing was created.
    pub listing_time: Timestamp,
    /// Last instant at which the item can be purchased.
    pub deadline: Timestamp,
}

impl AuctionRecord {
    /// The book key for this record.
    #[must_use]
    pub fn key(&self) -> ListingKey {
        ListingKey::new(self.collection, self.item_id)
    }

    /// Returns `true` once `now` is strictly past the deadline.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.deadline
    }

    /// Lifecycle state at `now`.
    #[must_use]
    pub fn status(&self, now: Timestamp) -> ListingStatus {
        if self.is_expired(now) {
            ListingStatus::Expired
        } else {
            ListingStatus::Listed
        }
    }

    /// Seconds left until the deadline, or zero once expired.
    #[must_use]
    pub fn time_remaining(&self, now: Timestamp) -> Timestamp {
        self.deadline.saturating_sub(now)
    }
}

/// A placeholder record for testing.
/// **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AuctionRecord {
    /// Listed at t=1000 for one hour, 5 units falling to a 1 unit floor.
    pub fn dummy(collection: CollectionId, item_id: ItemId, seller: AccountId) -> Self {
        use crate::constants::ONE_UNIT;
        let key = ListingKey::new(collection, item_id);
        Self {
            auction_id: AuctionId::deterministic(key, 0),
            seller,
            collection,
            item_id,
            starting_price: 5 * ONE_UNIT,
            reserve_price: ONE_UNIT,
            listing_time: 1_000,
            deadline: 1_000 + 3_600,
        }
    }
}
