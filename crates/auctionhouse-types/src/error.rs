//! Error types for the AuctionHouse engine.
//!
//! All errors use the `AH_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Listing errors
//! - 2xx: Purchase errors
//! - 3xx: Proceeds errors
//! - 4xx: Collaborator errors
//! - 9xx: Configuration / internal errors
//!
//! Every 1xx-3xx error is a precondition failure detected before any state
//! is touched. 4xx errors are raised after a failed external call, once the
//! engine has restored its prior state.

use thiserror::Error;

use crate::{AccountId, Amount, AuctionId, CollectionId, ItemId, Timestamp};

/// Central error enum for all AuctionHouse operations.
#[derive(Debug, Error)]
pub enum MarketError {
    // =================================================================
    // Listing Errors (1xx)
    // =================================================================
    /// The collection is not in the registry.
    #[error("AH_ERR_100: Unsupported collection: {0}")]
    UnsupportedCollection(CollectionId),

    /// The caller is not the item's current owner.
    #[error("AH_ERR_101: {caller} is not the owner of item {item_id}")]
    NotOwner { caller: AccountId, item_id: ItemId },

    /// The engine holds no transfer approval for the item.
    #[error("AH_ERR_102: Missing transfer approval for item {0}")]
    MissingApproval(ItemId),

    #[error("AH_ERR_103: Reserve price must be positive")]
    ReservePriceMustBePositive,

    #[error("AH_ERR_104: Starting price {starting} is below reserve price {reserve}")]
    StartingPriceBelowReservePrice { starting: Amount, reserve: Amount },

    /// Deadline not after `now`, or beyond the configured horizon.
    #[error("AH_ERR_105: Deadline {deadline} is invalid at {now} (max horizon {max_horizon}s)")]
    DeadlineIsInvalid {
        deadline: Timestamp,
        now: Timestamp,
        max_horizon: u64,
    },

    /// A live listing already exists for this (collection, item).
    #[error("AH_ERR_106: Item {item_id} of {collection} is already auctioned")]
    AlreadyAuctioned {
        collection: CollectionId,
        item_id: ItemId,
    },

    // =================================================================
    // Purchase Errors (2xx)
    // =================================================================
    /// No listing exists for this (collection, item).
    #[error("AH_ERR_200: Item {item_id} of {collection} is not auctioned")]
    NotAuctioned {
        collection: CollectionId,
        item_id: ItemId,
    },

    /// Payment is below the current decayed price.
    #[error("AH_ERR_201: Not enough funds sent: price {price}, paid {paid}")]
    NotEnoughFundsSent { price: Amount, paid: Amount },

    /// The listing's deadline has passed.
    #[error("AH_ERR_202: Auction {auction_id} expired at {deadline}")]
    AuctionExpired {
        auction_id: AuctionId,
        deadline: Timestamp,
    },

    // =================================================================
    // Proceeds Errors (3xx)
    // =================================================================
    #[error("AH_ERR_300: Insufficient proceeds: requested {requested}, available {available}")]
    InsufficientProceeds { requested: Amount, available: Amount },

    /// A ledger credit would overflow.
    #[error("AH_ERR_301: Arithmetic overflow in proceeds ledger")]
    ArithmeticOverflow,

    /// Ledger balances no longer match value received minus value paid out.
    #[error("AH_ERR_302: Proceeds invariant violation: {reason}")]
    ProceedsInvariantViolation { reason: String },

    // =================================================================
    // Collaborator Errors (4xx)
    // =================================================================
    /// The item collaborator refused the ownership transfer.
    #[error("AH_ERR_400: Item transfer failed: {0}")]
    ItemTransferFailed(#[source] CollaboratorError),

    /// The funds collaborator refused to release value.
    #[error("AH_ERR_401: Payout failed: {0}")]
    PayoutFailed(#[source] CollaboratorError),

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    #[error("AH_ERR_900: Configuration error: {0}")]
    Configuration(String),

    #[error("AH_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure reported by an external collaborator (item custody or funds).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct CollaboratorError {
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
