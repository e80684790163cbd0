//! Keyed store of listings.
//!
//! Records are kept in a `BTreeMap` keyed by (collection, item) so every
//! listing query returns them in the same order on every node.

use std::collections::BTreeMap;

use auctionhouse_types::{AuctionRecord, ListingKey, MarketError, Result, Timestamp};

/// Store of auction records, at most one per [`ListingKey`].
///
/// An expired record stays in the book until a new listing for the same
/// key replaces it.
#[derive(Debug, Default)]
pub struct AuctionBook {
    records: BTreeMap<ListingKey, AuctionRecord>,
}

impl AuctionBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored record for `key`, live or expired.
    #[must_use]
    pub fn get(&self, key: &ListingKey) -> Option<&AuctionRecord> {
        self.records.get(key)
    }

    /// Whether a purchasable (non-expired) record exists for `key`.
    #[must_use]
    pub fn is_live(&self, key: &ListingKey, now: Timestamp) -> bool {
        self.records.get(key).is_some_and(|r| !r.is_expired(now))
    }

    /// Store a new record.
    ///
    /// Returns the expired record it replaced, if any.
    ///
    /// # Errors
    /// Returns `AlreadyAuctioned` if a live record exists for the same key;
    /// the existing record is left untouched.
    pub fn insert(&mut self, record: AuctionRecord, now: Timestamp) -> Result<Option<AuctionRecord>> {
        let key = record.key();
        if self.is_live(&key, now) {
            return Err(MarketError::AlreadyAuctioned {
                collection: key.collection,
                item_id: key.item_id,
            });
        }
        let replaced = self.records.insert(key, record);
        if let Some(old) = &replaced {
            tracing::debug!(
                auction = %old.auction_id,
                key = %key,
                deadline = old.deadline,
                "Expired listing replaced"
            );
        }
        Ok(replaced)
    }

    /// Remove and return the record for `key`.
    pub fn remove(&mut self, key: &ListingKey) -> Option<AuctionRecord> {
        self.records.remove(key)
    }

    /// Put a previously removed record back, replacing whatever is stored
    /// under its key. Used to undo a failed settlement.
    pub fn reinstate(&mut self, record: AuctionRecord) {
        self.records.insert(record.key(), record);
    }

    /// Listings still purchasable at `now`, in key order.
    pub fn active(&self, now: Timestamp) -> impl Iterator<Item = &AuctionRecord> {
        self.records.values().filter(move |r| !r.is_expired(now))
    }

    /// Listings past their deadline at `now`, in key order.
    pub fn expired(&self, now: Timestamp) -> impl Iterator<Item = &AuctionRecord> {
        self.records.values().filter(move |r| r.is_expired(now))
    }

    /// All stored records in key order.
    pub fn iter(&self) -> impl Iterator<Item = &AuctionRecord> {
        self.records.values()
    }

    /// Number of stored records, live or expired.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
