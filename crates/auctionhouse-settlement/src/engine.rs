//! The settlement engine.
//!
//! Every public operation is one atomic state transition: either all of
//! its effects commit or none do. Purchases and withdrawals follow
//! checks-effects-interactions:
//!
//! ```text
//! purchase: validate → remove listing → credit ledger → transfer item → emit
//! withdraw: validate → debit ledger → pay out → emit
//! ```
//!
//! The engine commits its own state before calling a collaborator, so a
//! collaborator observing the engine mid-call sees the listing consumed
//! and the balance debited. If the collaborator fails, the engine restores
//! the exact prior state and surfaces the failure.

use auctionhouse_book::{AuctionBook, CollectionRegistry, ProceedsLedger};
use auctionhouse_pricing::{PriceOracle, next_price_drop};
use auctionhouse_types::{
    AccountId, Amount, AuctionId, AuctionRecord, CollectionId, EngineConfig, ItemId, ListingKey,
    MarketError, MarketEvent, OverpaymentPolicy, Result, Timestamp, format_units,
};

use crate::clock::{Clock, SystemClock};
use crate::collaborator::{FundsGateway, ItemCustodian};
use crate::conservation::ProceedsConservation;

/// Parameters of a new listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub seller: AccountId,
    pub collection: CollectionId,
    pub item_id: ItemId,
    pub starting_price: Amount,
    pub reserve_price: Amount,
    pub deadline: Timestamp,
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub auction_id: AuctionId,
    pub seller: AccountId,
    pub buyer: AccountId,
    /// Decayed price at the purchase instant.
    pub price: Amount,
    /// Overpayment credited back to the buyer's ledger entry.
    pub refunded: Amount,
}

/// Ledger credits a purchase will make, computed before any mutation.
struct PurchaseCredits {
    seller_credit: Amount,
    buyer_refund: Amount,
}

/// Dutch-auction marketplace engine.
///
/// Owns the collection registry, auction book, and proceeds ledger, plus
/// the external collaborators. Because every operation takes `&mut self`,
/// calls against one engine are serialized by construction.
pub struct SettlementEngine<C, F, K = SystemClock> {
    config: EngineConfig,
    registry: CollectionRegistry,
    book: AuctionBook,
    ledger: ProceedsLedger,
    conservation: ProceedsConservation,
    custodian: C,
    funds: F,
    clock: K,
    journal: Vec<MarketEvent>,
    /// Advances on every committed listing; feeds [`AuctionId::deterministic`].
    listing_sequence: u64,
}

impl<C: ItemCustodian, F: FundsGateway> SettlementEngine<C, F, SystemClock> {
    /// Create an engine reading wall-clock time.
    pub fn new(config: EngineConfig, custodian: C, funds: F) -> Result<Self> {
        Self::with_clock(config, custodian, funds, SystemClock)
    }
}

impl<C: ItemCustodian, F: FundsGateway, K: Clock> SettlementEngine<C, F, K> {
    /// Create an engine with an explicit clock.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn with_clock(config: EngineConfig, custodian: C, funds: F, clock: K) -> Result<Self> {
        config.validate()?;
        let registry = CollectionRegistry::new(config.supported_collections.iter().copied());
        tracing::info!(
            operator = %config.operator,
            collections = registry.len(),
            max_horizon = config.max_listing_horizon_secs,
            overpayment = ?config.overpayment,
            "Settlement engine started"
        );
        Ok(Self {
            registry,
            book: AuctionBook::new(),
            ledger: ProceedsLedger::new(),
            conservation: ProceedsConservation::new(),
            custodian,
            funds,
            clock,
            journal: Vec::new(),
            listing_sequence: 0,
            config,
        })
    }

    // =================================================================
    // Listing
    // =================================================================

    /// List an item at the engine clock's current time.
    pub fn create_listing(&mut self, request: ListingRequest) -> Result<AuctionId> {
        let now = self.clock.now();
        self.create_listing_at(request, now)
    }

    /// List an item for sale.
    ///
    /// Preconditions are checked in a fixed order and the first failure is
    /// returned; nothing is stored unless all of them hold.
    ///
    /// # Errors
    /// `UnsupportedCollection`, `NotOwner`, `MissingApproval`,
    /// `ReservePriceMustBePositive`, `StartingPriceBelowReservePrice`,
    /// `DeadlineIsInvalid`, `AlreadyAuctioned`.
    pub fn create_listing_at(&mut self, request: ListingRequest, now: Timestamp) -> Result<AuctionId> {
        if let Err(err) = self.validate_listing(&request, now) {
            tracing::debug!(
                seller = %request.seller,
                collection = %request.collection,
                item = %request.item_id,
                error = %err,
                "Listing rejected"
            );
            return Err(err);
        }

        let key = ListingKey::new(request.collection, request.item_id);
        let record = AuctionRecord {
            auction_id: AuctionId::deterministic(key, self.listing_sequence),
            seller: request.seller,
            collection: request.collection,
            item_id: request.item_id,
            starting_price: request.starting_price,
            reserve_price: request.reserve_price,
            listing_time: now,
            deadline: request.deadline,
        };
        let auction_id = record.auction_id;
        let event = MarketEvent::created(&record);

        self.book.insert(record, now)?;
        self.listing_sequence += 1;

        tracing::info!(
            auction = %auction_id,
            seller = %request.seller,
            key = %key,
            starting_price = request.starting_price,
            reserve_price = request.reserve_price,
            deadline = request.deadline,
            "Auction created"
        );
        self.journal.push(event);
        Ok(auction_id)
    }

    fn validate_listing(&self, request: &ListingRequest, now: Timestamp) -> Result<()> {
        let ListingRequest {
            seller,
            collection,
            item_id,
            starting_price,
            reserve_price,
            deadline,
        } = *request;

        if !self.registry.is_supported(&collection) {
            return Err(MarketError::UnsupportedCollection(collection));
        }
        if self.custodian.owner_of(collection, item_id) != Some(seller) {
            return Err(MarketError::NotOwner {
                caller: seller,
                item_id,
            });
        }
        if !self
            .custodian
            .is_approved_for_transfer(collection, item_id, self.config.operator)
        {
            return Err(MarketError::MissingApproval(item_id));
        }
        if reserve_price == 0 {
            return Err(MarketError::ReservePriceMustBePositive);
        }
        if starting_price < reserve_price {
            return Err(MarketError::StartingPriceBelowReservePrice {
                starting: starting_price,
                reserve: reserve_price,
            });
        }
        let max_horizon = self.config.max_listing_horizon_secs;
        if deadline <= now || deadline - now > max_horizon {
            return Err(MarketError::DeadlineIsInvalid {
                deadline,
                now,
                max_horizon,
            });
        }
        if self.book.is_live(&ListingKey::new(collection, item_id), now) {
            return Err(MarketError::AlreadyAuctioned {
                collection,
                item_id,
            });
        }
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    /// The stored listing for (collection, item), live or expired.
    #[must_use]
    pub fn listing(&self, collection: CollectionId, item_id: ItemId) -> Option<&AuctionRecord> {
        self.book.get(&ListingKey::new(collection, item_id))
    }

    /// Current price of a stored listing.
    ///
    /// # Errors
    /// Returns `NotAuctioned` if no listing exists.
    pub fn price(&self, collection: CollectionId, item_id: ItemId, now: Timestamp) -> Result<Amount> {
        self.listing(collection, item_id)
            .map(|record| PriceOracle::price_of(record, now))
            .ok_or(MarketError::NotAuctioned {
                collection,
                item_id,
            })
    }

    /// The raw price function, independent of any stored listing.
    #[must_use]
    pub fn quote(
        starting_price: Amount,
        reserve_price: Amount,
        listing_time: Timestamp,
        now: Timestamp,
    ) -> Amount {
        PriceOracle::price(starting_price, reserve_price, listing_time, now)
    }

    /// When the listing's price next drops, or `None` once it sits at the reserve.
    ///
    /// # Errors
    /// Returns `NotAuctioned` if no listing exists.
    pub fn next_price_drop(
        &self,
        collection: CollectionId,
        item_id: ItemId,
        now: Timestamp,
    ) -> Result<Option<Timestamp>> {
        self.listing(collection, item_id)
            .map(|record| next_price_drop(record, now))
            .ok_or(MarketError::NotAuctioned {
                collection,
                item_id,
            })
    }

    /// Listings purchasable at `now`, in (collection, item) order.
    #[must_use]
    pub fn active_listings(&self, now: Timestamp) -> Vec<&AuctionRecord> {
        self.book.active(now).collect()
    }

    /// Listings past their deadline at `now`, in (collection, item) order.
    #[must_use]
    pub fn expired_listings(&self, now: Timestamp) -> Vec<&AuctionRecord> {
        self.book.expired(now).collect()
    }

    /// Supported collections in configuration order, duplicates removed.
    #[must_use]
    pub fn supported_collections(&self) -> &[CollectionId] {
        self.registry.collections()
    }

    /// Returns `true` if listings from `collection` are accepted.
    #[must_use]
    pub fn is_supported(&self, collection: &CollectionId) -> bool {
        self.registry.is_supported(collection)
    }

    /// Withdrawable balance of `account`; zero for unknown accounts.
    #[must_use]
    pub fn proceeds_of(&self, account: &AccountId) -> Amount {
        self.ledger.balance(account)
    }

    // =================================================================
    // Purchase
    // =================================================================

    /// Buy a listed item at the engine clock's current time.
    pub fn purchase(
        &mut self,
        buyer: AccountId,
        collection: CollectionId,
        item_id: ItemId,
        paid: Amount,
    ) -> Result<Settlement> {
        let now = self.clock.now();
        self.purchase_at(buyer, collection, item_id, paid, now)
    }

    /// Buy a listed item for `paid` at instant `now`.
    ///
    /// # Errors
    /// - `NotAuctioned`, `AuctionExpired`, `NotEnoughFundsSent`,
    ///   `ArithmeticOverflow`: nothing changed.
    /// - `ItemTransferFailed`: the collaborator refused the transfer; the
    ///   listing, ledger, and totals were restored.
    pub fn purchase_at(
        &mut self,
        buyer: AccountId,
        collection: CollectionId,
        item_id: ItemId,
        paid: Amount,
        now: Timestamp,
    ) -> Result<Settlement> {
        let key = ListingKey::new(collection, item_id);

        // Checks
        let (auction_id, seller, price, credits) =
            match self.validate_purchase(&key, buyer, paid, now) {
                Ok(checked) => checked,
                Err(err) => {
                    tracing::debug!(
                        buyer = %buyer,
                        key = %key,
                        paid,
                        error = %err,
                        "Purchase rejected"
                    );
                    return Err(err);
                }
            };

        // Effects
        let Some(record) = self.book.remove(&key) else {
            return Err(MarketError::NotAuctioned {
                collection,
                item_id,
            });
        };
        self.ledger.credit(seller, credits.seller_credit)?;
        if credits.buyer_refund > 0 {
            self.ledger.credit(buyer, credits.buyer_refund)?;
        }
        self.conservation.record_received(paid)?;

        // Interactions
        if let Err(source) = self.custodian.transfer(collection, seller, buyer, item_id) {
            self.conservation.revert_received(paid);
            if credits.buyer_refund > 0 {
                self.ledger.reverse_credit(buyer, credits.buyer_refund);
            }
            self.ledger.reverse_credit(seller, credits.seller_credit);
            self.book.reinstate(record);
            tracing::warn!(
                auction = %auction_id,
                buyer = %buyer,
                key = %key,
                error = %source,
                "Item transfer failed, purchase rolled back"
            );
            return Err(MarketError::ItemTransferFailed(source));
        }

        tracing::info!(
            auction = %auction_id,
            buyer = %buyer,
            seller = %seller,
            key = %key,
            price,
            units = ?format_units(price),
            refunded = credits.buyer_refund,
            "Item purchased"
        );
        self.journal.push(MarketEvent::ItemPurchased {
            auction_id,
            buyer,
            collection,
            item_id,
            settlement_price: price,
        });

        Ok(Settlement {
            auction_id,
            seller,
            buyer,
            price,
            refunded: credits.buyer_refund,
        })
    }

    fn validate_purchase(
        &self,
        key: &ListingKey,
        buyer: AccountId,
        paid: Amount,
        now: Timestamp,
    ) -> Result<(AuctionId, AccountId, Amount, PurchaseCredits)> {
        let record = self.book.get(key).ok_or(MarketError::NotAuctioned {
            collection: key.collection,
            item_id: key.item_id,
        })?;
        if record.is_expired(now) {
            return Err(MarketError::AuctionExpired {
                auction_id: record.auction_id,
                deadline: record.deadline,
            });
        }
        let price = PriceOracle::price_of(record, now);
        if price > paid {
            return Err(MarketError::NotEnoughFundsSent { price, paid });
        }

        let credits = match self.config.overpayment {
            OverpaymentPolicy::RefundToBuyer => PurchaseCredits {
                seller_credit: price,
                buyer_refund: paid - price,
            },
            OverpaymentPolicy::RetainAsProceeds => PurchaseCredits {
                seller_credit: paid,
                buyer_refund: 0,
            },
        };

        // Every credit below must succeed once effects start.
        let seller_after = self
            .ledger
            .balance(&record.seller)
            .checked_add(credits.seller_credit);
        let buyer_after = if buyer == record.seller {
            seller_after.and_then(|b| b.checked_add(credits.buyer_refund))
        } else {
            self.ledger.balance(&buyer).checked_add(credits.buyer_refund)
        };
        let received_after = self.conservation.total_received().checked_add(paid);
        if seller_after.is_none() || buyer_after.is_none() || received_after.is_none() {
            return Err(MarketError::ArithmeticOverflow);
        }

        Ok((record.auction_id, record.seller, price, credits))
    }

    // =================================================================
    // Withdrawal
    // =================================================================

    /// Pay `amount` of `account`'s ledger balance out through the funds gateway.
    ///
    /// The ledger is debited before the payout; if the payout fails the
    /// debit is undone.
    ///
    /// # Errors
    /// - `InsufficientProceeds`: nothing changed.
    /// - `PayoutFailed`: the gateway refused; the ledger was restored.
    pub fn withdraw(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        // Checks + effects
        if let Err(err) = self.ledger.debit(account, amount) {
            tracing::debug!(account = %account, amount, error = %err, "Withdrawal rejected");
            return Err(err);
        }
        self.conservation.record_paid_out(amount);

        // Interactions
        if let Err(source) = self.funds.pay(account, amount) {
            self.conservation.revert_paid_out(amount);
            self.ledger.reverse_debit(account, amount);
            tracing::warn!(
                account = %account,
                amount,
                error = %source,
                "Payout failed, withdrawal rolled back"
            );
            return Err(MarketError::PayoutFailed(source));
        }

        tracing::info!(
            account = %account,
            amount,
            units = ?format_units(amount),
            remaining = self.ledger.balance(&account),
            "Proceeds withdrawn"
        );
        self.journal.push(MarketEvent::ProceedsWithdrawn { account, amount });
        Ok(())
    }

    // =================================================================
    // Journal, invariants, accessors
    // =================================================================

    /// Events committed since the last drain, oldest first.
    #[must_use]
    pub fn events(&self) -> &[MarketEvent] {
        &self.journal
    }

    /// Take all pending events, leaving the journal empty.
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Check that ledger balances equal value received minus value paid out.
    ///
    /// # Errors
    /// Returns `ProceedsInvariantViolation` (or `ArithmeticOverflow` if the
    /// ledger total cannot be summed).
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(self.ledger.total()?)
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The item collaborator.
    #[must_use]
    pub fn custodian(&self) -> &C {
        &self.custodian
    }

    /// Mutable access to the item collaborator (e.g. to simulate approvals).
    pub fn custodian_mut(&mut self) -> &mut C {
        &mut self.custodian
    }

    /// The funds collaborator.
    #[must_use]
    pub fn funds(&self) -> &F {
        &self.funds
    }

    /// Mutable access to the funds collaborator.
    pub fn funds_mut(&mut self) -> &mut F {
        &mut self.funds
    }

    /// The clock read by the convenience entry points.
    #[must_use]
    pub fn clock(&self) -> &K {
        &self.clock
    }
}
