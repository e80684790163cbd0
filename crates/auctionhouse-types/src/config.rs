//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{AccountId, CollectionId, MarketError, Result, constants};

/// What happens to the part of a payment above the settlement price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// Credit the excess to the buyer's ledger entry, withdrawable like proceeds.
    #[default]
    RefundToBuyer,
    /// Credit the whole payment to the seller.
    RetainAsProceeds,
}

/// Configuration for one engine instance. Fixed for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The engine's own identity; must hold transfer approval for listed items.
    pub operator: AccountId,
    /// Collections accepted for listing, in declaration order.
    pub supported_collections: Vec<CollectionId>,
    /// Maximum `deadline - now` accepted at listing time.
    #[serde(default = "default_horizon")]
    pub max_listing_horizon_secs: u64,
    #[serde(default)]
    pub overpayment: OverpaymentPolicy,
}

fn default_horizon() -> u64 {
    constants::DEFAULT_MAX_LISTING_HORIZON_SECS
}

impl EngineConfig {
    /// Config with defaults for everything but the operator and collections.
    #[must_use]
    pub fn new(operator: AccountId, supported_collections: Vec<CollectionId>) -> Self {
        Self {
            operator,
            supported_collections,
            max_listing_horizon_secs: default_horizon(),
            overpayment: OverpaymentPolicy::default(),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.supported_collections.is_empty() {
            return Err(MarketError::Configuration(
                "supported_collections must not be empty".into(),
            ));
        }
        if self.max_listing_horizon_secs == 0 {
            return Err(MarketError::Configuration(
                "max_listing_horizon_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}
