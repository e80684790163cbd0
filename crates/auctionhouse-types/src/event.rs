//! Notifications emitted for external indexers.
//!
//! The engine appends one event per committed operation to its journal.
//! Events are never emitted for rejected or rolled-back calls.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AuctionId, AuctionRecord, CollectionId, ItemId, Timestamp};

/// A committed state change, serializable for indexers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A listing was created. Carries every field of the record.
    AuctionCreated {
        auction_id: AuctionId,
        seller: AccountId,
        collection: CollectionId,
        item_id: ItemId,
        #[serde(with = "crate::amount::amount_str")]
        starting_price: Amount,
        #[serde(with = "crate::amount::amount_str")]
        reserve_price: Amount,
        listing_time: Timestamp,
        deadline: Timestamp,
    },
    /// A listing was purchased and the item moved to the buyer.
    ItemPurchased {
        auction_id: AuctionId,
        buyer: AccountId,
        collection: CollectionId,
        item_id: ItemId,
        #[serde(with = "crate::amount::amount_str")]
        settlement_price: Amount,
    },
    /// Value left the engine for an account.
    ProceedsWithdrawn {
        account: AccountId,
        #[serde(with = "crate::amount::amount_str")]
        amount: Amount,
    },
}

impl MarketEvent {
    /// Creation event for a freshly stored record.
    #[must_use]
    pub fn created(record: &AuctionRecord) -> Self {
        Self::AuctionCreated {
            auction_id: record.auction_id,
            seller: record.seller,
            collection: record.collection,
            item_id: record.item_id,
            starting_price: record.starting_price,
            reserve_price: record.reserve_price,
            listing_time: record.listing_time,
            deadline: record.deadline,
        }
    }

    /// The auction this event refers to, if any.
    #[must_use]
    pub fn auction_id(&self) -> Option<AuctionId> {
        match self {
            Self::AuctionCreated { auction_id, .. } | Self::ItemPurchased { auction_id, .. } => {
                Some(*auction_id)
            }
            Self::ProceedsWithdrawn { .. } => None,
        }
    }
}
