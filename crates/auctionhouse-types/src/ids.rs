//! Identifiers used throughout AuctionHouse.
//!
//! Accounts and collections are 20-byte addresses rendered as `0x`-prefixed
//! hex. Auction ids are derived deterministically so that replaying the same
//! call sequence yields the same ids on every node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::MarketError;

/// Parse a `0x`-prefixed (or bare) 40-char hex string into 20 bytes.
fn parse_address(s: &str) -> Result<[u8; 20], MarketError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits)
        .map_err(|e| MarketError::Serialization(format!("invalid address {s:?}: {e}")))?;
    <[u8; 20]>::try_from(bytes.as_slice()).map_err(|_| {
        MarketError::Serialization(format!(
            "invalid address {s:?}: expected 20 bytes, got {}",
            bytes.len()
        ))
    })
}

macro_rules! address_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; 20]);

        impl $name {
            #[must_use]
            pub fn from_bytes(bytes: [u8; 20]) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 20] {
                &self.0
            }

            /// First four bytes in hex, for compact log fields.
            #[must_use]
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = MarketError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_address(s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = MarketError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AccountId / CollectionId
// ---------------------------------------------------------------------------

address_id!(
    /// An account address: seller, buyer, or the engine operator itself.
    AccountId
);

address_id!(
    /// Address of an external item collection (e.g. an NFT contract).
    CollectionId
);

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Token id of an item within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ListingKey
// ---------------------------------------------------------------------------

/// The unique key of a listing: at most one live record per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListingKey {
    pub collection: CollectionId,
    pub item_id: ItemId,
}

impl ListingKey {
    #[must_use]
    pub fn new(collection: CollectionId, item_id: ItemId) -> Self {
        Self {
            collection,
            item_id,
        }
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.collection, self.item_id)
    }
}

// ---------------------------------------------------------------------------
// AuctionId
// ---------------------------------------------------------------------------

/// Unique identifier handed to indexers for every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AuctionId(pub Uuid);

impl AuctionId {
    /// Deterministic `AuctionId` from the listing key and the engine's
    /// listing sequence number.
    ///
    /// Re-listing the same item yields a fresh id because the sequence
    /// number always advances.
    #[must_use]
    pub fn deterministic(key: ListingKey, sequence: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"auctionhouse:auction_id:v1:");
        hasher.update(key.collection.as_bytes());
        hasher.update(key.item_id.0.to_le_bytes());
        hasher.update(sequence.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auction:{}", self.0)
    }
}
