//! # auctionhouse-types
//!
//! Shared types, errors, and configuration for the **AuctionHouse**
//! Dutch-auction marketplace engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`CollectionId`], [`ItemId`], [`AuctionId`], [`ListingKey`]
//! - **Amounts**: [`Amount`], [`Timestamp`], [`format_units`]
//! - **Auction model**: [`AuctionRecord`], [`ListingStatus`]
//! - **Events**: [`MarketEvent`]
//! - **Configuration**: [`EngineConfig`], [`OverpaymentPolicy`]
//! - **Errors**: [`MarketError`] with `AH_ERR_` prefix codes, [`CollaboratorError`]
//! - **Constants**: pricing parameters and defaults

pub mod amount;
pub mod auction;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;

pub use amount::*;
pub use auction::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;

// Constants are accessed via `auctionhouse_types::constants::FOO`
// (not re-exported to avoid name collisions).
